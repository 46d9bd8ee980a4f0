/// Common HTTP/HTTPS ports plus the alternates CDNs proxy.
pub const CDN_PORTS: [&str; 13] = [
    "80", "8080", "8880", "2052", "2082", "2086", "2095", "443", "2053", "2083", "2087", "2096",
    "8443",
];
