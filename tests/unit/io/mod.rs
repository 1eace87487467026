mod logging;
mod store;
