//! Per-compilation negotiation state.

use have_ast::{GenericTemplate, ObjectArena, ObjectId};
use have_types::{DeclId, TypeTable};
use rustc_hash::FxHashMap;

use crate::env::TypeEnv;
use crate::generics::{InstKey, InstState, SubstitutingParser, TemplateParser};
use crate::negotiate::Frame;
use crate::{builtins, Config};

/// Everything negotiation reads and writes for one compilation.
///
/// Built once at the compiler entry point and passed explicitly to every
/// pass; nothing here is process-global.
pub struct TypesContext {
    pub objects: ObjectArena,
    pub types: TypeTable,
    pub(crate) env: TypeEnv,
    pub(crate) templates: Vec<GenericTemplate>,
    /// Named types exported by imported packages, by (import name, type name).
    pub(crate) package_types: FxHashMap<(String, String), DeclId>,
    pub(crate) instances: FxHashMap<InstKey, InstState>,
    /// Keys in first-request order.
    pub(crate) inst_order: Vec<InstKey>,
    /// External names taken by instantiations.
    pub(crate) inst_names: FxHashMap<String, ObjectId>,
    pub(crate) parser: Box<dyn TemplateParser>,
    pub(crate) config: Config,
    pub(crate) depth: usize,
    pub(crate) frames: Vec<Frame>,
}

impl TypesContext {
    pub fn new(config: Config) -> Self {
        Self::with_parser(config, Box::new(SubstitutingParser))
    }

    /// A context that re-parses generic bodies with `parser`.
    pub fn with_parser(config: Config, parser: Box<dyn TemplateParser>) -> Self {
        let mut ctx = TypesContext {
            objects: ObjectArena::new(),
            types: TypeTable::new(),
            env: TypeEnv::new(),
            templates: Vec::new(),
            package_types: FxHashMap::default(),
            instances: FxHashMap::default(),
            inst_order: Vec::new(),
            inst_names: FxHashMap::default(),
            parser,
            config,
            depth: 0,
            frames: Vec::new(),
        };
        builtins::register(&mut ctx);
        ctx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for TypesContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
