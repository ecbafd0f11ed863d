//! an example demonstrating the standalone kvline logger
//! Configure it with KVLINE_LEVEL, KVLINE_FORMAT and KVLINE_NAME. i.e. KVLINE_FORMAT=json

use kvline::{kv, logger::Builder, FieldOpts, Level, Loggable, Value};
use std::{collections::BTreeMap, io};

struct Listener {
    addr: std::net::SocketAddr,
    backlog: u32,
    tls: Option<String>,
}

impl Loggable for Listener {
    fn log_value(&self) -> Value<'_> {
        Value::record()
            .field("addr", &self.addr)
            .field("backlog", &self.backlog)
            .field_with("tls", &self.tls, FieldOpts::new().omit_empty())
            .build()
    }
}

#[derive(serde::Serialize)]
struct Limits {
    max_conns: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deny: Vec<&'static str>,
}

fn main() -> Result<(), kvline::Error> {
    let logger = Builder::from_env()?.name("demo").build();
    let listener = Listener {
        addr: ([127, 0, 0, 1], 8080).into(),
        backlog: 128,
        tls: None,
    };
    let limits = Limits {
        max_conns: 512,
        deny: vec![],
    };
    let mut weights = BTreeMap::new();
    weights.insert(1u8, 0.25f32);
    weights.insert(2u8, 0.75f32);

    let http = logger.with_values(&kv!["component", "http"]);
    http.info(
        "listening",
        &kv![
            "listener",
            Value::loggable(&listener),
            "limits",
            Value::serde(&limits),
            "weights",
            weights
        ],
    );
    http.debug("odd field list", &kv!["dangling"]);

    let err = io::Error::new(io::ErrorKind::AddrInUse, "address in use");
    logger.set_level(Level::Error);
    logger.error(Some(&err), "bind failed", &kv!["retry_in", std::time::Duration::from_millis(1500)]);
    Ok(())
}
