//! 형식 파서 벤치마크
//!
//! syslog, JSON, PaloAlto CSV 파서의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use sluice_core::error::SluiceError;
use sluice_core::metadata::{Metadata, Record, message_record};
use sluice_core::stage::{FormatParser, Sink};
use sluice_pipeline::parser::{JsonParser, PaloAltoParser, SyslogParser, YearStrategy};

/// 산출물을 버리는 싱크
struct NullSink;

impl Sink for NullSink {
    fn recv(&mut self, _meta: Metadata, _record: Record) -> Result<(), SluiceError> {
        Ok(())
    }
}

const SYSLOG_LINE: &str =
    "Nov 21 06:00:24 ip-172-31-7-118 sshd[23511]: Failed password for root from 203.0.113.45";

const JSON_LINE: &str = r#"{"timestamp":"2018-05-12T06:00:24Z","host":"web-01","process":"nginx","message":"request processed","status":200,"path":"/api/v1/users"}"#;

/// TRAFFIC 하위 형식의 54열 행을 구성합니다.
fn traffic_line() -> String {
    let mut cells = vec![String::new(); 54];
    cells[3] = "TRAFFIC".to_owned();
    cells[7] = "10.0.0.5".to_owned();
    cells[8] = "203.0.113.20".to_owned();
    cells[24] = "51324".to_owned();
    cells[25] = "443".to_owned();
    cells[29] = "tcp".to_owned();
    cells[31] = "6400".to_owned();
    cells[32] = "1280".to_owned();
    cells[33] = "5120".to_owned();
    cells[35] = "2018/05/12 06:00:24".to_owned();
    cells.join(",")
}

fn run(parser: &dyn FormatParser, line: &str) {
    let mut sink = NullSink;
    parser
        .recv(Metadata::new(), message_record(line), &mut sink)
        .expect("bench input must parse");
}

fn bench_syslog(c: &mut Criterion) {
    let parser = SyslogParser::new().with_year(YearStrategy::Fixed(2018));

    let mut group = c.benchmark_group("syslog");
    group.throughput(Throughput::Elements(1));
    group.bench_function("line", |b| {
        b.iter(|| run(&parser, black_box(SYSLOG_LINE)))
    });
    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let parser = JsonParser::new();

    let mut group = c.benchmark_group("json");
    group.throughput(Throughput::Elements(1));
    group.bench_function("line", |b| b.iter(|| run(&parser, black_box(JSON_LINE))));
    group.finish();
}

fn bench_paloalto(c: &mut Criterion) {
    let parser = PaloAltoParser::new();
    let line = traffic_line();

    let mut group = c.benchmark_group("paloalto");
    group.throughput(Throughput::Elements(1));
    group.bench_function("traffic_row", |b| {
        b.iter(|| run(&parser, black_box(&line)))
    });
    group.finish();
}

criterion_group!(benches, bench_syslog, bench_json, bench_paloalto);
criterion_main!(benches);
