pub async fn ping() -> &'static str {
    "ok"
}
