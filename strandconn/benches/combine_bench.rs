// StrandConn combiner benchmarks using criterion.
//
// Measures:
//   - combine() cost per capability shape
//   - Base-operation dispatch through a combined connection
//   - Bulk-path dispatch through a combined connection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use strandconn::{
    combine, BulkReceive, BulkSend, Capability, CapabilitySet, CombinePolicy, Connection,
    HalfClose,
};

/// Connection that does no I/O and declares a fixed capability set.
struct NullConn(CapabilitySet);

impl Connection for NullConn {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn close(&self) -> io::Result<()> {
        Ok(())
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    }

    fn set_read_timeout(&self, _dur: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn set_write_timeout(&self, _dur: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        self.0
            .contains(Capability::BulkReceive)
            .then_some(self as &dyn BulkReceive)
    }

    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        self.0
            .contains(Capability::BulkSend)
            .then_some(self as &dyn BulkSend)
    }

    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        self.0
            .contains(Capability::HalfClose)
            .then_some(self as &dyn HalfClose)
    }
}

impl BulkReceive for NullConn {
    fn receive_from(&self, _source: &mut dyn Read) -> io::Result<u64> {
        Ok(0)
    }
}

impl BulkSend for NullConn {
    fn send_to(&self, _sink: &mut dyn Write) -> io::Result<u64> {
        Ok(0)
    }
}

impl HalfClose for NullConn {
    fn close_outbound(&self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// combine() per shape
// ---------------------------------------------------------------------------

fn bench_combine(c: &mut Criterion) {
    let policy = CombinePolicy::all();
    let outer: Arc<dyn Connection> = Arc::new(NullConn(CapabilitySet::EMPTY));

    let mut group = c.benchmark_group("combine");
    for bits in [0b000u8, 0b001, 0b011, 0b111] {
        let caps = CapabilitySet::from_bits(bits).unwrap();
        let inner: Arc<dyn Connection> = Arc::new(NullConn(caps));
        group.bench_with_input(
            BenchmarkId::from_parameter(caps.to_string()),
            &inner,
            |b, inner| {
                b.iter(|| {
                    black_box(combine(
                        Arc::clone(&outer),
                        Some(Arc::clone(inner)),
                        &policy,
                    ));
                });
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Dispatch through the combined connection
// ---------------------------------------------------------------------------

fn bench_dispatch(c: &mut Criterion) {
    let outer: Arc<dyn Connection> = Arc::new(NullConn(Capability::BulkReceive.into()));
    let inner: Arc<dyn Connection> = Arc::new(NullConn(CapabilitySet::ALL));
    let conn = combine(outer, Some(inner), &CombinePolicy::all());
    let mut buf = [0u8; 1024];

    c.bench_function("dispatch_read", |b| {
        b.iter(|| black_box(conn.read(black_box(&mut buf)).unwrap()));
    });

    c.bench_function("dispatch_receive_from_outer", |b| {
        b.iter(|| {
            let receive = conn.as_bulk_receive().unwrap();
            black_box(receive.receive_from(&mut io::empty()).unwrap())
        });
    });

    c.bench_function("dispatch_send_to_inner", |b| {
        b.iter(|| {
            let send = conn.as_bulk_send().unwrap();
            black_box(send.send_to(&mut io::sink()).unwrap())
        });
    });
}

criterion_group!(benches, bench_combine, bench_dispatch);
criterion_main!(benches);
