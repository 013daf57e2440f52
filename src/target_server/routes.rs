use std::path::{Path, PathBuf};

use super::response::Response;

/// Last path segments that are never served.
const RESTRICTED: [&str; 3] = ["students.html", ".pgitignore", ".git"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    BadRequest,
    Entry,
    Forbidden,
    /// Path relative to the document root.
    File(PathBuf),
}

fn file_extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx + 1..])
}

fn is_forbidden(segment: &str) -> bool {
    if RESTRICTED.contains(&segment) {
        return true;
    }
    match file_extension(segment) {
        // no extension, treated as a directory
        None => true,
        Some("py") => true,
        Some(_) => false,
    }
}

/// Decides what to answer from the raw request text.
pub fn route(request: &str) -> Route {
    let mut parts = request.split_whitespace();
    let target = match (parts.next(), parts.next()) {
        (Some(_method), Some(target)) => target.to_lowercase(),
        _ => return Route::BadRequest,
    };

    if target == "/" {
        return Route::Entry;
    }

    // /grades////students.html must not slip past the restricted lookup
    let path = target.trim_end_matches('/');
    let requested = path.rsplit('/').next().unwrap_or_default();

    if is_forbidden(requested) || path.split('/').any(|segment| segment == "..") {
        return Route::Forbidden;
    }

    Route::File(PathBuf::from(path.trim_start_matches('/')))
}

/// Resolves a request against the document root.
pub async fn respond(request: &str, root: &Path) -> Response {
    match route(request) {
        Route::BadRequest => Response::bad_request(),
        Route::Entry => Response::ok(),
        Route::Forbidden => Response::forbidden(),
        Route::File(relative) => {
            let full = root.join(&relative);
            match tokio::fs::read_to_string(&full).await {
                Ok(contents) if !contents.is_empty() => {
                    let content_type = match relative.extension().and_then(|e| e.to_str()) {
                        Some("html") => "text/html",
                        _ => "text/plain",
                    };
                    Response::file(content_type, contents)
                }
                Ok(_) => Response::not_found(),
                Err(e) => {
                    log::debug!("Cannot serve {}: {e}", full.display());
                    Response::not_found()
                }
            }
        }
    }
}
