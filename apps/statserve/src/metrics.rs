use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

static API_REQ: Lazy<Mutex<HashMap<String, u64>>> = Lazy::new(|| Mutex::new(HashMap::new()));

pub fn inc_api_request(path: &str) {
    let mut g = API_REQ.lock().unwrap();
    *g.entry(path.to_string()).or_insert(0) += 1;
}

pub fn gather_prometheus(build_version: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# TYPE statserve_build_info gauge\nstatserve_build_info{{version=\"{}\"}} 1\n",
        build_version
    ));
    out.push_str(
        "# HELP statserve_api_requests_total API requests total\n# TYPE statserve_api_requests_total counter\n",
    );
    for (k, v) in API_REQ.lock().unwrap().iter() {
        out.push_str(&format!(
            "statserve_api_requests_total{{path=\"{}\"}} {}\n",
            k, v
        ));
    }
    out
}
