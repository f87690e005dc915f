use std::path::PathBuf;

pub const DEFAULT_INPUT_GLOB: &str = "*.csv";
pub const DEFAULT_EXCLUDE_GLOB: &str = "output*";
pub const DEFAULT_OUTPUT_PREFIX: &str = "output_";
/// Quote character of the input dialect. Output always uses `"`.
pub const DEFAULT_INPUT_QUOTE: u8 = b'|';

/// Everything a run needs to know. Defaults reproduce a bare invocation
/// in the current directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub dir: PathBuf,
    pub input_glob: String,
    pub exclude_glob: String,
    pub output_prefix: String,
    pub input_quote: u8,
    /// Log and skip files that fail instead of aborting the run.
    pub keep_going: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            input_glob: DEFAULT_INPUT_GLOB.to_string(),
            exclude_glob: DEFAULT_EXCLUDE_GLOB.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            input_quote: DEFAULT_INPUT_QUOTE,
            keep_going: false,
        }
    }
}

impl Config {
    /// Default config rooted at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Write outputs as `<prefix><name>` and exclude `<prefix>*` from
    /// discovery. The default prefix keeps the wider `output*` exclusion.
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix != DEFAULT_OUTPUT_PREFIX {
            self.exclude_glob = format!("{}*", glob::Pattern::escape(&prefix));
        }
        self.output_prefix = prefix;
        self
    }

    pub fn input_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// `output_<name>` next to the source file.
    pub fn output_name(&self, file_name: &str) -> String {
        format!("{}{}", self.output_prefix, file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(self.output_name(file_name))
    }
}
