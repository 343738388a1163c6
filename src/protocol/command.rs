//! Command definitions
//!
//! A command is a name followed by positional arguments and options.
//!
//! ```text
//! name [arg]* [key[=value]]*
//! ```

use std::fmt;

use super::escape::escape;

/// Commands after which the server ends the session
const SESSION_ENDING: [&str; 2] = ["quit", "disconnect"];

/// A scalar that can be sent as an argument or option value
pub trait ArgValue {
    /// Unescaped wire text
    fn to_arg(&self) -> String;
}

macro_rules! display_arg {
    ($($t:ty),*) => {
        $(impl ArgValue for $t {
            fn to_arg(&self) -> String {
                self.to_string()
            }
        })*
    };
}

display_arg!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, str, String);

/// Booleans travel as 0/1
impl ArgValue for bool {
    fn to_arg(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }
}

impl<T: ArgValue + ?Sized> ArgValue for &T {
    fn to_arg(&self) -> String {
        (**self).to_arg()
    }
}

/// A command ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,

    /// Positional arguments, never empty strings
    args: Vec<String>,

    /// `key=value` options; `None` is a bare flag
    options: Vec<(String, Option<String>)>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Add a positional argument. Empty values are dropped.
    pub fn arg(mut self, value: impl ArgValue) -> Self {
        let value = value.to_arg();
        if !value.is_empty() {
            self.args.push(value);
        }
        self
    }

    /// Add a `key=value` option
    pub fn option(mut self, key: impl Into<String>, value: impl ArgValue) -> Self {
        self.options.push((key.into(), Some(value.to_arg())));
        self
    }

    /// Add an option only when a value is given
    pub fn option_opt<V: ArgValue>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.option(key, value),
            None => self,
        }
    }

    /// Add a bare key, e.g. `-uid`
    pub fn flag(mut self, key: impl Into<String>) -> Self {
        self.options.push((key.into(), None));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> &[(String, Option<String>)] {
        &self.options
    }

    /// True for commands the server answers by closing the connection
    pub fn ends_session(&self) -> bool {
        SESSION_ENDING.contains(&self.name.as_str())
    }

    /// Serialize to one wire line, without the terminator.
    ///
    /// Arguments and option values are escaped; option keys are not.
    pub fn encode(&self) -> String {
        let mut line = self.name.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&escape(arg));
        }
        for (key, value) in &self.options {
            line.push(' ');
            line.push_str(key);
            if let Some(value) = value {
                line.push('=');
                line.push_str(&escape(value));
            }
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
