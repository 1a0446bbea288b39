// Desktop notification after a switch
use anyhow::Result;
use notify_rust::Notification;
use std::time::Duration;
use tracing::info;

use crate::command::MAX_DISPLAY_CHARS;
use micswitch_utils::StringUtils;

pub async fn show_notification(title: &str, message: &str, expire: Duration) -> Result<()> {
    info!("Showing notification: {} - {}", title, message);

    let title = title.to_string();
    let message = message.to_string();
    let millis = u32::try_from(expire.as_millis()).unwrap_or(u32::MAX);

    // The notification server round-trip blocks.
    tokio::task::spawn_blocking(move || {
        Notification::new()
            .summary(&title)
            .body(&message)
            .timeout(notify_rust::Timeout::Milliseconds(millis))
            .show()
            .map(|_| ())
    })
    .await
    .map_err(|e| anyhow::anyhow!("Task error: {}", e))?
    .map_err(|e| anyhow::anyhow!("Failed to show notification: {}", e))
}

pub async fn show_device_notification(display_name: &str, expire: Duration) -> Result<()> {
    show_notification(
        "Microphone Changed",
        &format!(
            "Switched to: {}",
            StringUtils::truncate_chars(display_name, MAX_DISPLAY_CHARS)
        ),
        expire,
    )
    .await
}
