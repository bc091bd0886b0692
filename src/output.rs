use std::sync::Mutex;

/// Where plan reports go: a terminal for the CLI, a buffer for library callers
pub trait OutputHandler: Send + Sync {
    /// Section title
    fn heading(&self, message: &str);

    /// One entry of a listing (a table, a foreign key, an edge)
    fn item(&self, message: &str);

    fn info(&self, message: &str);

    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    Heading,
    Item,
    Info,
    Success,
    Warning,
    Error,
}

/// Library output handler that collects messages
#[derive(Default)]
pub struct LibraryOutputHandler {
    messages: Mutex<Vec<(OutputLevel, String)>>,
}

impl LibraryOutputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_messages(&self) -> Vec<(OutputLevel, String)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages of one level, in emission order
    pub fn messages_at(&self, level: OutputLevel) -> Vec<String> {
        self.get_messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn add_message(&self, level: OutputLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

impl OutputHandler for LibraryOutputHandler {
    fn heading(&self, message: &str) {
        self.add_message(OutputLevel::Heading, message);
    }

    fn item(&self, message: &str) {
        self.add_message(OutputLevel::Item, message);
    }

    fn info(&self, message: &str) {
        self.add_message(OutputLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.add_message(OutputLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.add_message(OutputLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.add_message(OutputLevel::Error, message);
    }
}

/// CLI output handler that prints to stdout with colors
#[cfg(feature = "cli")]
pub struct CliOutputHandler;

#[cfg(feature = "cli")]
impl OutputHandler for CliOutputHandler {
    fn heading(&self, message: &str) {
        use owo_colors::OwoColorize;
        println!("\n{}", message.bold());
    }

    fn item(&self, message: &str) {
        use owo_colors::OwoColorize;
        println!("  {} {}", "•".dimmed(), message);
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        use owo_colors::OwoColorize;
        println!("{} {}", "✓".green(), message);
    }

    fn warning(&self, message: &str) {
        use owo_colors::OwoColorize;
        println!("{} {}", "⚠".yellow(), message);
    }

    fn error(&self, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("{} {}", "✗".red(), message);
    }
}

/// Silent output handler that discards all output
pub struct SilentOutputHandler;

impl OutputHandler for SilentOutputHandler {
    fn heading(&self, _message: &str) {}
    fn item(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
