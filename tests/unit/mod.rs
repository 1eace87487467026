//! Unit tests, one file per source file under `src/`

mod algorithm;
mod io;
mod spatial;
