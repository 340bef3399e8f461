mod headers;

pub use headers::parse_headers;
