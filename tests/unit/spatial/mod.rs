mod grid;
mod symbols;
