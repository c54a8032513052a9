use embervale_client::app::{self, window_conf};

#[macroquad::main(window_conf)]
async fn main() {
    app::run().await;
}
