use std::future::Future;
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::Client;
use tokio::time::Instant;

#[async_trait::async_trait]
pub trait WebDriverExt {
    /// Clicks through JavaScript, which works on controls hidden behind overlays.
    async fn js_click(&self, element: &Element) -> Result<(), CmdError>;
    async fn scroll_into_view(&self, element: &Element) -> Result<(), CmdError>;
    async fn ready_state(&self) -> Result<String, CmdError>;
}

#[async_trait::async_trait]
impl WebDriverExt for Client {
    async fn js_click(&self, element: &Element) -> Result<(), CmdError> {
        let arg = serde_json::to_value(element).map_err(CmdError::Json)?;
        self.execute("arguments[0].click();", vec![arg]).await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), CmdError> {
        let arg = serde_json::to_value(element).map_err(CmdError::Json)?;
        self.execute("arguments[0].scrollIntoView();", vec![arg])
            .await?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, CmdError> {
        let state = self.execute("return document.readyState;", vec![]).await?;
        Ok(state.as_str().unwrap_or_default().to_owned())
    }
}

/// Polls `condition` every `every` until it holds or `timeout` elapses.
/// Returns whether the condition was met.
pub async fn poll_until<F, Fut>(timeout: Duration, every: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(every).await;
    }
}
