mod functions;
mod quoting;
mod rewrites;
mod types;
