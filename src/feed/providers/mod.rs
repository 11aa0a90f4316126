pub mod hn_http;
