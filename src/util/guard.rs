//! Wrappers the console composes around engine calls: error reporting,
//! confirmation, timing and a keyed result cache.

use std::{
    collections::HashMap,
    io::{self, BufRead, Write},
    time::Instant,
};

use log::{debug, warn};

use crate::core::{DbError, ErrorKind};

/// Run `f`, printing a message for its error instead of passing it on.
pub fn report_errors<T, W, F>(output: &mut W, f: F) -> Option<T>
where
    W: Write,
    F: FnOnce() -> Result<T, DbError>,
{
    match f() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("{}", err);
            // Nothing more to do if the console itself is gone.
            let _ = writeln!(output, "{}", describe(&err));
            None
        }
    }
}

/// User-facing wording for each error category.
pub fn describe(err: &DbError) -> String {
    match err.kind {
        ErrorKind::NotFound => format!("Error: {}.", err.message),
        ErrorKind::Validation => format!("Validation error: {}.", err.message),
        ErrorKind::Syntax => format!(
            "Syntax error: {}. Type \"help\" for the list of commands.",
            err.message
        ),
        ErrorKind::Corruption => format!("Error: damaged data document: {}.", err.message),
        ErrorKind::Io => format!(
            "Error: data files are not accessible ({}). Is the database initialized?",
            err.message
        ),
    }
}

/// Ask `prompt [y/n]:` and return whether the answer was `y`.
/// End of input counts as a refusal.
pub fn confirm<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{} [y/n]: ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Run `f` and report how long it took.
pub fn timed<T, W, F>(label: &str, output: &mut W, f: F) -> T
where
    W: Write,
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();

    debug!("{} took {:.6}s", label, elapsed);
    // Nothing more to do if the console itself is gone.
    let _ = writeln!(output, "Command \"{}\" finished in {:.3} seconds.", label, elapsed);
    result
}

/// String-keyed memo table with an explicit `clear`.
#[derive(Debug)]
pub struct Cache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for Cache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> Cache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Cached value for `key`, computing and storing it with `f` on a miss.
    /// A failed computation stores nothing.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: &str, f: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if self.entries.contains_key(key) {
            debug!("Cache hit for {:?}", key);
        } else {
            let value = f()?;
            self.entries.insert(key.to_string(), value);
        }
        Ok(&self.entries[key])
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: &str, f: F) -> &V {
        match self.get_or_try_insert_with::<std::convert::Infallible, _>(key, || Ok(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("Cache cleared ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
