#[tokio::main]
async fn main() {
    shop::start_server().await;
}
