//! Simple form upload example.
//!
//! Posts a text field and an inline image to httpbin and prints the
//! normalized response.

use formnet::FormUpload;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let response = FormUpload::new("https://httpbin.org/post")
        .header("X-Demo", "formnet")
        .field("name", "alice")
        .field("avatar", "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==")
        .timeout_ms(10_000)
        .send()
        .await?;

    println!("Status: {} {}", response.status, response.status_text);
    println!("Headers:");
    for (name, value) in &response.headers {
        println!("  {}: {}", name, value);
    }
    println!("Data: {:?}", response.data);

    Ok(())
}
