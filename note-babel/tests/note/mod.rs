//! Note record tests: titles, keywords and the serialize/deserialize pair

mod keywords;
mod records;
