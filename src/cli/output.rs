//! Output formatting for the CLI.
//!
//! Provides colored, human-readable output with a JSON mode that suppresses
//! all decorative printing so reports stay machine-parseable.

use colored::Colorize;

/// Output formatter for different output modes.
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            json_mode,
            verbosity,
        }
    }

    /// Whether JSON mode is active.
    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    /// Print a banner/header.
    pub fn banner(&self, title: &str) {
        if self.json_mode {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header.
    pub fn section(&self, title: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print an informational message.
    pub fn info(&self, message: &str) {
        if self.json_mode {
            return;
        }
        println!("{}", message);
    }

    /// Print a debug message (verbosity >= 2 only).
    #[allow(dead_code)]
    pub fn debug(&self, message: &str) {
        if self.json_mode || self.verbosity < 2 {
            return;
        }
        if self.use_color {
            println!("{}", message.bright_black());
        } else {
            println!("{}", message);
        }
    }

    /// Print a warning message.
    #[allow(dead_code)]
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            return;
        }
        if self.use_color {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        } else {
            eprintln!("warning: {}", message);
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        if self.use_color && !self.json_mode {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }

    /// Print one checklist line: the action name and its granted status.
    pub fn action_result(&self, action: &str, granted: bool) {
        if self.json_mode {
            return;
        }

        let status = if granted {
            if self.use_color {
                "granted".green().to_string()
            } else {
                "granted".to_string()
            }
        } else if self.use_color {
            "MISSING".red().bold().to_string()
        } else {
            "MISSING".to_string()
        };

        println!("  {:<55} [{}]", action, status);
    }

    /// Print the pass/fail summary line.
    pub fn verdict(&self, passed: bool, granted: usize, required: usize) {
        if self.json_mode {
            return;
        }

        let summary = format!("{}/{} required permissions granted", granted, required);
        if passed {
            if self.use_color {
                println!("\n{} {}", "PASSED".green().bold(), summary);
            } else {
                println!("\nPASSED {}", summary);
            }
        } else if self.use_color {
            println!("\n{} {}", "FAILED".red().bold(), summary);
        } else {
            println!("\nFAILED {}", summary);
        }
    }
}
