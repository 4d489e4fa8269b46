pub mod authors;
pub mod books;
pub mod http;
pub mod intercept;

pub use authors::AuthorsClient;
pub use books::BooksClient;
pub use http::{CallOutcome, HttpClient};
pub use intercept::{ForensicInterceptor, Interceptor, RequestContext};
