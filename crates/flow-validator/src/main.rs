#[tokio::main]
async fn main() {
    flow_validator::start(std::env::args()).await;
}
