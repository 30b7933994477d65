use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = bookmarks_api::run_server().await {
        eprintln!("bookmarks-api failed: {:#}", e);
        process::exit(1);
    }
}
