use chrono::{TimeZone, Utc};
use pricing_parser::{extract_all, Document, ExtractorConfig, PriceExtractor, Provider, SourceDocument};
use pricing_parser::extractors::DoubaoExtractor;

fn at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, 6, 0, 0).unwrap()
}

const CLAUDE_PAGE: &str = r#"
<html><body>
<h2>Model pricing</h2>
<table class="w-full">
  <thead><tr>
    <th>Model</th><th>Base Input Tokens</th><th>5m Cache Writes</th>
    <th>1h Cache Writes</th><th>Cache Hits &amp; Refreshes</th><th>Output Tokens</th>
  </tr></thead>
  <tbody>
    <tr><td>Claude Opus 4</td><td>$15 / MTok</td><td>$18.75 / MTok</td><td>$30 / MTok</td><td>$1.50 / MTok</td><td>$75 / MTok</td></tr>
    <tr><td>Claude Haiku 3</td><td>$0.25 / MTok</td><td>$0.30 / MTok</td><td>$0.50 / MTok</td><td>$0.03 / MTok</td><td>$1.25 / MTok</td></tr>
  </tbody>
</table>
</body></html>
"#;

const DOUBAO_MARKDOWN: &str = "\
|模型名称|条件|输入（元）|输出（元）|
|---|---|---|---|
|豆包-pro|默认|0.80|2.00|
";

#[test]
fn claude_table_to_records() {
    let result = Provider::Claude.run(Some(CLAUDE_PAGE), &ExtractorConfig::default(), at());

    assert_eq!(result.provider, "Claude");
    assert_eq!(result.currency, "USD");
    assert_eq!(result.models.len(), 2);

    let opus = &result.models[0];
    assert_eq!(opus.model_id, "claude-opus-4");
    assert_eq!(opus.input_price_per_mtok, 15.0);
    assert_eq!(opus.output_price_per_mtok, 75.0);
    assert_eq!(opus.context_window, 200_000);
    assert_eq!(result.models[1].input_price_per_mtok, 0.25);
}

#[test]
fn doubao_markdown_converted_from_cny() {
    let config = ExtractorConfig::with_cny_to_usd(Some(1.0 / 7.2));
    let result = Provider::Doubao.run(Some(DOUBAO_MARKDOWN), &config, at());

    assert_eq!(result.currency, "USD (converted from CNY)");
    assert_eq!(result.exchange_rate.as_deref(), Some("1 USD = 7.2 CNY"));

    let record = &result.models[0];
    assert_eq!(record.model_name, "豆包-pro");
    assert_eq!(record.input_price_per_mtok, 0.1111);
    assert_eq!(record.output_price_per_mtok, 0.2778);
    assert_eq!(record.original_currency.as_deref(), Some("CNY"));
    assert_eq!(record.original_input_price, Some(0.8));
    assert_eq!(record.original_output_price, Some(2.0));
    assert_eq!(record.notes, "CNY: ¥0.8/¥2.0 per 1M tokens");
}

#[test]
fn doubao_table_wins_over_payload() {
    let html = r#"
    <html><body>
    <table>
      <tr><th>模型</th><th>输入（元/百万token）</th><th>输出（元/百万token）</th></tr>
      <tr><td>doubao-from-table</td><td>1.00</td><td>2.00</td></tr>
    </table>
    <script>window._ROUTER_DATA = {"loaderData":{"doc":{"curDoc":{"MDContent":"|模型名称|输入（元）|输出（元）|\n|---|---|---|\n|doubao-from-payload|3.00|4.00|"}}}};</script>
    </body></html>
    "#;

    let records = DoubaoExtractor::new(&ExtractorConfig::default()).extract(&Document::parse(html));
    let ids: Vec<_> = records.iter().map(|r| r.model_id.as_str()).collect();
    assert_eq!(ids, vec!["doubao-from-table"]);
}

#[test]
fn doubao_payload_with_continuation_rows() {
    let md = "价格单位：元/百万token\n\n\
              |模型名称|条件|缓存输入（元）|输入（元）|输出（元）|\n\
              |---|---|---|---|---|\n\
              |doubao\\-seed\\-1.6|输入长度 [0, 32]|0.16|0.80|-|\n\
              |^^|输入长度 (32, 128]|0.16|1.20|16.00|\n\
              |doubao-lite|在线推理|不支持|不支持|不支持|\n";
    let payload = serde_json::json!({"loaderData": {"page": {"curDoc": {"MDContent": md}}}});
    let html = format!("<div id=\"root\"></div><script>window._ROUTER_DATA = {payload};\nwindow.x = 1;</script>");

    let result = Provider::Doubao.run(Some(&html), &ExtractorConfig::default(), at());
    assert_eq!(result.models.len(), 1);

    let seed = &result.models[0];
    assert_eq!(seed.model_id, "doubao-seed-1-6");
    assert_eq!(seed.original_input_price, Some(1.2));
    assert_eq!(seed.original_output_price, Some(16.0));
}

#[test]
fn doubao_price_phrases_last() {
    let html = "<div>豆包-lite-4k：0.3元/千tokens 输入，0.6元/千tokens 输出</div>";
    let result = Provider::Doubao.run(Some(html), &ExtractorConfig::with_cny_to_usd(Some(0.125)), at());

    assert_eq!(result.models.len(), 1);
    assert_eq!(result.models[0].original_input_price, Some(300.0));
    assert_eq!(result.models[0].input_price_per_mtok, 37.5);
    assert_eq!(result.exchange_rate.as_deref(), Some("1 USD = 8.0 CNY"));
}

#[test]
fn empty_result_has_no_conversion_metadata() {
    let result = Provider::Doubao.run(Some("<div id=\"root\"></div>"), &ExtractorConfig::default(), at());
    assert!(result.models.is_empty());
    assert_eq!(result.currency, "USD");
    assert!(result.exchange_rate.is_none());
    assert!(result.cny_to_usd_rate.is_none());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("exchange_rate").is_none());
}

#[test]
fn batch_snapshot() {
    let documents = vec![
        SourceDocument {
            provider: Provider::Claude,
            html: Some(CLAUDE_PAGE.to_string()),
        },
        SourceDocument {
            provider: Provider::Doubao,
            html: Some(DOUBAO_MARKDOWN.to_string()),
        },
        SourceDocument {
            provider: Provider::OpenAi,
            html: None,
        },
    ];

    let snapshot = extract_all(&documents, &ExtractorConfig::default(), at());
    assert_eq!(snapshot.providers.len(), 3);
    assert_eq!(snapshot.model_count(), 3);

    let flat: Vec<_> = snapshot
        .all_models()
        .iter()
        .map(|m| (m.provider, m.record.model_id.clone()))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("Claude", "claude-opus-4".to_string()),
            ("Claude", "claude-haiku-3".to_string()),
            ("Doubao", "pro".to_string()),
        ]
    );
}
