pub use eyre::Result;
use libloading::{library_filename, Library};
use std::{ffi::OsStr, fmt::Debug, ops::Deref, sync::Arc};

mod counters;
mod pipeline;
mod shuffle;

pub use counters::{CounterSnapshot, Counters};
pub use pipeline::{JobOutput, Pipeline};
pub use shuffle::{GroupedEntry, Shuffle};

pub type KeyValue = (String, String);

/// A map-reduce job: key extraction over single records, and reduction over
/// every value grouped under one key.
pub trait App: Debug + Send + Sync {
    /// Extracts zero or more key/value pairs from one input record.
    ///
    /// A record the job cannot make sense of yields nothing.
    fn map(&self, record: &str) -> Vec<KeyValue>;

    /// Reduces all values of `key` into output records. Called exactly once
    /// per distinct key, with a non-empty `values`.
    fn reduce(&self, key: &str, values: Vec<String>, counters: &Counters) -> Vec<String>;
}

type BuildFn = fn() -> Box<dyn App>;

#[macro_export]
macro_rules! declare_app {
    ($constructor:expr) => {
        #[no_mangle]
        pub fn _build_app() -> Box<dyn ::common::App> {
            Box::new($constructor())
        }
    };
}

pub struct LoadedApp {
    app: Arc<dyn App>,
    // must outlive `app`, whose code lives in the library
    _lib: Library,
}

impl Debug for LoadedApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LoadedApp").field(&self.app).finish()
    }
}

impl Deref for LoadedApp {
    type Target = Arc<dyn App>;

    fn deref(&self) -> &Self::Target {
        &self.app
    }
}

pub fn load_app(name: impl AsRef<OsStr>) -> Result<LoadedApp> {
    let (app, lib) = unsafe {
        let lib = Library::new(library_filename(name))?;
        let app = {
            let build_fn = lib.get::<BuildFn>(b"_build_app\0")?;
            build_fn()
        };
        (app, lib)
    };
    Ok(LoadedApp {
        app: Arc::from(app),
        _lib: lib,
    })
}
