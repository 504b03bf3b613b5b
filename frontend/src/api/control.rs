use faderdeck_types::StateSnapshot;
use tracing::debug;

use crate::addressing::ChannelKey;

use super::*;

impl ApiClient {
    /// Ask the engine to set a channel's gain.
    ///
    /// Returns the gain the engine confirmed, which may differ from `value`.
    pub async fn set_gain(&self, key: &ChannelKey, value: i32) -> ApiResult<f32> {
        let url = format!(
            "{}{}?value={}",
            self.base_url,
            key.gain_path(self.device),
            value
        );
        debug!("Setting gain: {}", url);

        let body = self.get_accepted(&url).await?;
        let trimmed = body.trim();
        trimmed
            .parse::<f32>()
            .map_err(|e| ApiError::Decode(format!("gain reply {:?}: {}", trimmed, e)))
    }

    /// Ask the engine to mute or unmute a channel. The reply body is ignored.
    pub async fn set_mute(&self, key: &ChannelKey, muted: bool) -> ApiResult<()> {
        let url = format!(
            "{}{}?value={}",
            self.base_url,
            key.mute_path(self.device),
            u8::from(muted)
        );
        debug!("Setting mute: {}", url);

        self.get_accepted(&url).await?;
        Ok(())
    }

    /// Poll the full live state of the device.
    pub async fn fetch_state(&self) -> ApiResult<StateSnapshot> {
        let url = format!("{}/{}", self.base_url, self.device);

        let body = self.get_accepted(&url).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Issue a GET and return the body of a `200 OK` reply. Any other status,
    /// including other 2xx codes, is a rejection.
    async fn get_accepted(&self, url: &str) -> ApiResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}
