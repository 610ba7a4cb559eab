//! Where `print` statements send their text.

/// Print sink, enum-dispatched.
#[derive(Debug, Default)]
pub enum Output {
    /// Writes each line to stdout.
    #[default]
    Stdout,
    /// Collects lines in memory, for tests and embedding.
    Buffer(String),
    /// Discards everything.
    Silent,
}

impl Output {
    pub fn buffer() -> Self {
        Output::Buffer(String::new())
    }

    pub fn println(&mut self, msg: &str) {
        match self {
            Output::Stdout => println!("{msg}"),
            Output::Buffer(buffer) => {
                buffer.push_str(msg);
                buffer.push('\n');
            }
            Output::Silent => {}
        }
    }

    /// Everything printed so far. Always empty unless buffering.
    pub fn captured(&self) -> &str {
        match self {
            Output::Buffer(buffer) => buffer,
            Output::Stdout | Output::Silent => "",
        }
    }
}
