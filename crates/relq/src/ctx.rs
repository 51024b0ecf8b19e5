//! Rendering context.
//!
//! A [`SqlContext`] is created per logical unit of work and passed explicitly to
//! every entry point that needs it; there is no ambient/thread-local default.
//! It carries the dialect, the render options, a small extension bag for
//! memoized per-context values, and close listeners that tear those values down
//! when the scope ends.

use crate::dialect::{Dialect, GenericDialect, OracleDialect, PgDialect};
use crate::error::{SqlError, SqlResult};
use crate::types::TypeCatalog;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Keyword casing applied by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
}

/// Options controlling SQL text shape (not meaning).
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Break statements onto keyword-led lines when a fragment reports itself
    /// as multi-line.
    pub pretty: bool,
    /// Emit attached comments and parameter previews into the SQL text.
    pub comments: bool,
    pub keyword_case: KeywordCase,
}

impl RenderOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_comments(mut self) -> Self {
        self.comments = true;
        self
    }
}

type ExtensionMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Per-unit-of-work configuration: dialect, render options, memoized
/// extensions and close listeners.
pub struct SqlContext {
    dialect: Arc<dyn Dialect>,
    options: RenderOptions,
    extensions: Mutex<ExtensionMap>,
    close_listeners: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
    closed: AtomicBool,
}

impl SqlContext {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            options: RenderOptions::default(),
            extensions: Mutex::new(HashMap::new()),
            close_listeners: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// A context over the portable dialect.
    pub fn generic() -> Self {
        Self::new(Arc::new(GenericDialect))
    }

    /// A context over the PostgreSQL dialect.
    pub fn pg() -> Self {
        Self::new(Arc::new(PgDialect))
    }

    /// A context over the Oracle dialect.
    pub fn oracle() -> Self {
        Self::new(Arc::new(OracleDialect))
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The active dialect's type catalog.
    pub fn types(&self) -> &TypeCatalog {
        self.dialect.types()
    }

    /// Fetch the context-scoped instance of `T`, creating it on first use.
    ///
    /// The instance lives until [`close`](Self::close); this is the memoization
    /// channel for per-context caches (expression namespaces and the like).
    pub fn extension<T, F>(&self, init: F) -> SqlResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if self.is_closed() {
            return Err(SqlError::usage("context is closed"));
        }
        let mut map = self
            .extensions
            .lock()
            .map_err(|_| SqlError::usage("context extension map poisoned"))?;
        let entry = map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(init()) as Arc<dyn Any + Send + Sync>);
        entry
            .clone()
            .downcast::<T>()
            .map_err(|_| SqlError::usage("context extension type confusion"))
    }

    /// Register a listener to run when the context closes.
    pub fn on_close<F>(&self, listener: F) -> SqlResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_closed() {
            return Err(SqlError::usage("context is closed"));
        }
        self.close_listeners
            .lock()
            .map_err(|_| SqlError::usage("context listener list poisoned"))?
            .push(Box::new(listener));
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// End the unit of work: drop all extensions and run the close listeners.
    /// Closing twice is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut map) = self.extensions.lock() {
            map.clear();
        }
        let listeners = match self.close_listeners.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        };
        for listener in listeners {
            listener();
        }
    }
}

impl Drop for SqlContext {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SqlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlContext")
            .field("dialect", &self.dialect.name())
            .field("options", &self.options)
            .field("closed", &self.is_closed())
            .finish()
    }
}
