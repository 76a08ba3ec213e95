use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use rhai::{Engine, EvalAltResult, Module, ModuleResolver, Position, Scope, Shared};
use tracing::{debug, trace};

/// Compiled modules keyed by canonicalized file path, shared across runs.
///
/// Keying by canonical path (never by the raw `import` string) means two
/// different identifiers resolving to the same file share one compiled unit.
/// Entries are inserted only once fully built, so concurrent resolutions
/// never observe a partial module; duplicate concurrent builds of the same
/// file are last-writer-wins.
pub(crate) type ModuleCache = Arc<DashMap<PathBuf, Shared<Module>>>;

/// File extension appended to extension-less module identifiers.
const MODULE_EXTENSION: &str = "rhai";

/// Resolves `import` identifiers against an ordered list of base directories.
///
/// The first directory containing a matching source file wins. Resolution is
/// cached per canonical path, so a module's top-level side effects run once
/// per cache lifetime regardless of how many scripts import it, and re-parse
/// costs are paid once.
///
/// By default the resolver is *not* sandboxed: an identifier may traverse
/// out of the base directories (`../shared/util`), matching the behavior of
/// reading arbitrary files reachable from the configured roots. Hosts that
/// need containment set `sandboxed`, which rejects any resolution whose
/// canonical path escapes every base directory.
#[derive(Debug, Clone)]
pub struct PathModuleResolver {
    search_paths: Vec<PathBuf>,
    sandboxed: bool,
    cache: ModuleCache,
}

impl PathModuleResolver {
    /// Create a resolver with its own empty cache.
    pub fn new(search_paths: Vec<PathBuf>, sandboxed: bool) -> Self {
        Self::with_cache(search_paths, sandboxed, ModuleCache::default())
    }

    /// Create a resolver sharing an existing cache.
    pub(crate) fn with_cache(
        search_paths: Vec<PathBuf>,
        sandboxed: bool,
        cache: ModuleCache,
    ) -> Self {
        Self {
            search_paths,
            sandboxed,
            cache,
        }
    }

    /// Search the base directories in order; first existing file wins.
    fn locate(&self, path: &str) -> Option<PathBuf> {
        let mut relative = PathBuf::from(path);
        if relative.extension().is_none() {
            relative.set_extension(MODULE_EXTENSION);
        }
        for base in &self.search_paths {
            let candidate = base.join(&relative);
            if let Ok(canonical) = candidate.canonicalize() {
                if canonical.is_file() && (!self.sandboxed || self.contains(&canonical)) {
                    return Some(canonical);
                }
            }
        }
        None
    }

    fn contains(&self, canonical: &Path) -> bool {
        self.search_paths.iter().any(|base| {
            base.canonicalize()
                .map(|base| canonical.starts_with(base))
                .unwrap_or(false)
        })
    }
}

impl ModuleResolver for PathModuleResolver {
    fn resolve(
        &self,
        engine: &Engine,
        _source: Option<&str>,
        path: &str,
        pos: Position,
    ) -> Result<Shared<Module>, Box<EvalAltResult>> {
        let file = self
            .locate(path)
            .ok_or_else(|| Box::new(EvalAltResult::ErrorModuleNotFound(path.to_string(), pos)))?;

        if let Some(entry) = self.cache.get(&file) {
            trace!(module = path, file = %file.display(), "module cache hit");
            return Ok(entry.value().clone());
        }

        debug!(module = path, file = %file.display(), "compiling module");
        let text = fs::read_to_string(&file).map_err(|err| {
            Box::new(EvalAltResult::ErrorInModule(
                path.to_string(),
                Box::new(EvalAltResult::ErrorRuntime(err.to_string().into(), pos)),
                pos,
            ))
        })?;
        let mut ast = engine.compile(&text).map_err(|err| {
            Box::new(EvalAltResult::ErrorInModule(
                path.to_string(),
                Box::new(EvalAltResult::ErrorParsing(*err.0, err.1)),
                pos,
            ))
        })?;
        ast.set_source(path);

        let module = Module::eval_ast_as_new(Scope::new(), &ast, engine)
            .map_err(|err| Box::new(EvalAltResult::ErrorInModule(path.to_string(), err, pos)))?;

        let module: Shared<Module> = Shared::new(module);
        self.cache.insert(file, module.clone());
        Ok(module)
    }
}
