//! Import tests: splitting flat files into notes and batch file import

mod files;
mod splitter;
