#![allow(dead_code)]

use histdump_spider::{ProxyError, RequestClient, Response};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HISTORY_PAGE: &str = include_str!("../files/history.html");

/// One scripted answer from the fake upstream.
#[derive(Debug, Clone)]
pub enum Reply {
    Page(u16, String),
    Nothing,
    Fail(String),
}

impl Reply {
    pub fn history() -> Self {
        Reply::Page(200, HISTORY_PAGE.to_string())
    }
}

/// An in-memory [`RequestClient`]: each ticker plays its script in order,
/// repeating the last reply once the script runs out.
#[derive(Debug, Default)]
pub struct MockUpstream {
    scripts: HashMap<String, Vec<Reply>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, ticker: &str, replies: Vec<Reply>) -> Self {
        self.scripts.insert(ticker.to_string(), replies);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self, ticker: &str) -> usize {
        self.calls.lock().unwrap().get(ticker).copied().unwrap_or(0)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, ticker: &str) -> Reply {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(ticker.to_string()).or_insert(0);
        *count += 1;

        match self.scripts.get(ticker) {
            Some(script) if !script.is_empty() => {
                script[(*count - 1).min(script.len() - 1)].clone()
            }
            _ => Reply::Page(404, "<html><body>Symbol not found</body></html>".to_string()),
        }
    }
}

/// `https://finance.yahoo.com/quote/AAPL/history/` -> `AAPL`
fn ticker_of(url: &str) -> String {
    url.split("/quote/")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}

impl RequestClient for MockUpstream {
    async fn get(&self, url: &str) -> Result<Option<Response>, ProxyError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let reply = self.next_reply(&ticker_of(url));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Reply::Page(status, text) => Ok(Some(Response { status, text })),
            Reply::Nothing => Ok(None),
            Reply::Fail(msg) => Err(ProxyError::Other(msg)),
        }
    }
}
