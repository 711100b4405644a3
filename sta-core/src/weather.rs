//! Current-temperature lookup.
//!
//! The analysis only needs a resolved temperature, so the lookup sits behind
//! the [`WeatherLookup`] trait. The OpenWeatherMap implementation is compiled
//! with the `api` feature.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "api")]
use log::{info, warn};
#[cfg(feature = "api")]
use reqwest::{Client, StatusCode};

/// Current weather endpoint, queried with `q`, `appid` and `units`.
pub const DEFAULT_WEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Reasons a current temperature could not be obtained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// The API rejected the key (HTTP 401)
    #[error("invalid API key")]
    Unauthorized,

    /// The request never produced a response
    #[error("weather request failed: {0}")]
    Transport(String),

    /// Any other non-success status
    #[error("weather service returned status {0}")]
    Status(u16),

    /// A success response without a usable temperature
    #[error("unexpected weather response: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Map a non-success HTTP status to its error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => WeatherError::Unauthorized,
            s => WeatherError::Status(s),
        }
    }

    /// Transport failures and server-side errors may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Transport(_) => true,
            WeatherError::Status(s) => *s >= 500,
            WeatherError::Unauthorized | WeatherError::Parse(_) => false,
        }
    }
}

/// Source of the current temperature for a city, in degrees Celsius.
#[allow(async_fn_in_trait)]
pub trait WeatherLookup {
    async fn current_temperature(&self, city: &str, api_key: &str) -> Result<f64, WeatherError>;
}

/// Connection settings for the weather client.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_tries: u32,
    /// Wait before the first retry; doubled after each further failure.
    pub retry_delay: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_tries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

/// Extract `main.temp` from a current-weather JSON body.
pub fn parse_current_temperature(body: &str) -> Result<f64, WeatherError> {
    let weather: CurrentWeather =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    Ok(weather.main.temp)
}

/// OpenWeatherMap current-weather client.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    client: Client,
    config: WeatherConfig,
}

#[cfg(feature = "api")]
impl OpenWeatherMap {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;
        Ok(OpenWeatherMap { client, config })
    }

    async fn request_once(&self, city: &str, api_key: &str) -> Result<f64, WeatherError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(WeatherError::from_status(response.status().as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;
        parse_current_temperature(&body)
    }
}

#[cfg(feature = "api")]
impl WeatherLookup for OpenWeatherMap {
    /// Fetch the current temperature, retrying transport failures and 5xx
    /// responses with exponential backoff.
    async fn current_temperature(&self, city: &str, api_key: &str) -> Result<f64, WeatherError> {
        let max_tries = self.config.max_tries.max(1);
        let mut delay = self.config.retry_delay;
        let mut attempt = 1;
        loop {
            match self.request_once(city, api_key).await {
                Ok(temp) => {
                    info!("Current temperature for {}: {} °C", city, temp);
                    return Ok(temp);
                }
                Err(e) if e.is_retryable() && attempt < max_tries => {
                    warn!("Attempt {}/{}: weather lookup for {} failed: {}", attempt, max_tries, city, e);
                    info!("Sleeping for {} milliseconds before retry for {}", delay.as_millis(), city);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("Weather lookup for {} failed: {}", city, e);
                    return Err(e);
                }
            }
        }
    }
}


#[cfg(all(test, feature = "api"))]
mod client_tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const BODY: &str = r#"{"main":{"temp":21.4},"name":"Berlin","cod":200}"#;

    /// Serve one canned response per connection, recording each request line.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&request);
                let line = text.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(line);
                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        (format!("http://{}/data/2.5/weather", addr), requests)
    }

    fn client(base_url: String) -> OpenWeatherMap {
        OpenWeatherMap::new(WeatherConfig {
            base_url,
            timeout: Duration::from_secs(5),
            max_tries: 3,
            retry_delay: Duration::from_millis(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetches_metric_temperature() {
        let (url, requests) = serve(vec![(200, BODY)]).await;
        let temp = client(url).current_temperature("Berlin", "secret").await;
        assert_eq!(temp, Ok(21.4));
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("GET /data/2.5/weather?"));
        assert!(requests[0].contains("q=Berlin"));
        assert!(requests[0].contains("appid=secret"));
        assert!(requests[0].contains("units=metric"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let (url, requests) = serve(vec![(401, r#"{"cod":401}"#), (200, BODY)]).await;
        let result = client(url).current_temperature("Berlin", "bad").await;
        assert_eq!(result, Err(WeatherError::Unauthorized));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let (url, requests) = serve(vec![(404, r#"{"cod":"404"}"#), (200, BODY)]).await;
        let result = client(url).current_temperature("Atlantis", "key").await;
        assert_eq!(result, Err(WeatherError::Status(404)));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let (url, requests) = serve(vec![(503, "{}"), (503, "{}"), (503, "{}"), (200, BODY)]).await;
        let result = client(url).current_temperature("Berlin", "key").await;
        assert_eq!(result, Err(WeatherError::Status(503)));
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_server_error() {
        let (url, requests) = serve(vec![(500, "{}"), (200, BODY)]).await;
        let result = client(url).current_temperature("Berlin", "key").await;
        assert_eq!(result, Ok(21.4));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let result = client(format!("http://{}/weather", addr))
            .current_temperature("Berlin", "key")
            .await;
        assert!(matches!(result, Err(WeatherError::Transport(_))));
    }
}
