//! Blocking sessions over real TCP sockets

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rock_wire::protocol::message::{RESULT_OK, RESULT_UNHANDLED};
use rock_wire::{Dispatcher, MessageCodec, Session};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const CMD_ECHO: u32 = 1;
const CMD_SUM: u32 = 2;
const NTY_TICK: u32 = 10;

fn echo_dispatcher(ticks: Arc<AtomicUsize>) -> Dispatcher {
    let dispatcher = Dispatcher::new();
    dispatcher
        .register_request(CMD_ECHO, |req, rsp| {
            rsp.result_code = RESULT_OK;
            rsp.body = req.body.clone();
            Ok(())
        })
        .unwrap();
    dispatcher
        .register_request(CMD_SUM, |req, rsp| {
            let total: u64 = req.body.iter().map(|b| u64::from(*b)).sum();
            rsp.result_code = RESULT_OK;
            rsp.result_message = total.to_string();
            Ok(())
        })
        .unwrap();
    dispatcher
        .register_notify(NTY_TICK, move |_| {
            ticks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    dispatcher
}

#[test]
fn test_client_server_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let ticks = Arc::new(AtomicUsize::new(0));
    let dispatcher = echo_dispatcher(Arc::clone(&ticks));

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let mut session = Session::new(socket, MessageCodec::default());
        session.serve(&dispatcher).unwrap()
    });

    let socket = TcpStream::connect(addr).unwrap();
    let mut client = Session::new(socket, MessageCodec::default());

    let rsp = client.request(CMD_ECHO, "ping").unwrap();
    assert!(rsp.is_ok());
    assert_eq!(rsp.body, b"ping");

    client.notify(NTY_TICK, "").unwrap();

    let rsp = client.request(CMD_SUM, vec![1u8; 100_000]).unwrap();
    assert_eq!(rsp.result_message, "100000");
    assert_eq!(rsp.sequence_number, 2);

    let rsp = client.request(99, "").unwrap();
    assert_eq!(rsp.result_code, RESULT_UNHANDLED);

    client.close().unwrap();
    drop(client);

    assert_eq!(server.join().unwrap(), 3);
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_clients_share_dispatcher() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let dispatcher = echo_dispatcher(Arc::new(AtomicUsize::new(0)));
    const CLIENTS: usize = 4;

    let acceptor = thread::spawn(move || {
        let mut workers = Vec::new();
        for _ in 0..CLIENTS {
            let (socket, _) = listener.accept().unwrap();
            let dispatcher = dispatcher.clone();
            workers.push(thread::spawn(move || {
                Session::new(socket, MessageCodec::default())
                    .serve(&dispatcher)
                    .unwrap()
            }));
        }
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .sum::<u64>()
    });

    let clients: Vec<_> = (0..CLIENTS)
        .map(|i| {
            thread::spawn(move || {
                let mut session =
                    Session::new(TcpStream::connect(addr).unwrap(), MessageCodec::default());
                for n in 0..10 {
                    let body = format!("client {i} message {n}");
                    let rsp = session.request(CMD_ECHO, body.clone()).unwrap();
                    assert_eq!(rsp.body, body.as_bytes());
                }
            })
        })
        .collect();

    for c in clients {
        c.join().unwrap();
    }
    assert_eq!(acceptor.join().unwrap(), (CLIENTS * 10) as u64);
}
