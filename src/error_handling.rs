use std::fmt::Display;

pub trait ErrorType: Display + PartialEq {}

// Where in the grammar text an error was found. Line 0 means the grammar
// as a whole rather than a particular line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Location {
    pub line: usize
}

impl Location {
    pub fn whole() -> Self {
        Location { line: 0 }
    }

    pub fn line(line: usize) -> Self {
        Location { line }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "grammar")
        } else {
            write!(f, "line {}", self.line)
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn at(line: usize, error: T) -> Self {
        Error { location: Location::line(line), error }
    }

    pub fn whole(error: T) -> Self {
        Error { location: Location::whole(), error }
    }
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.location, self.error)
    }
}

impl<T: ErrorType + std::fmt::Debug> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;

// Joins a list of errors into one message, one error per line
pub fn join_errors<T: ErrorType>(errors: &Errors<T>) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

// Terminal colouring used by the binary when printing errors
pub fn highlight<T: ErrorType>(error: &Error<T>) -> String {
    format!("\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", error.location, error.error)
}
