//! Fetch flows driven directly through the worker

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use common::{addr, fast_policy, owner, token, worker, FakeCollection, FakeResolver, FakeWallet};
use mintscope::domain::OwnedNft;
use mintscope::infrastructure::runtime::{RuntimeCommand, RuntimeEvent, Screen, Worker};
use mintscope::store::CachedName;

async fn run(worker: &Worker, cmd: RuntimeCommand) -> Vec<RuntimeEvent> {
    let (tx, rx) = mpsc::channel();
    worker.handle(cmd, &tx).await;
    rx.try_iter().collect()
}

fn sample_collection() -> FakeCollection {
    FakeCollection {
        tokens: vec![
            token("1", "Genesis Call", "2024-01-10"),
            token("3", "Sunset Call", "2024-03-02"),
            token("2", "Midday Call", "2024-02-05"),
        ],
        owners: vec![
            owner(addr(0xa), &[("1", 3), ("2", 2)]),
            owner(addr(0xb), &[("1", 4), ("3", 1)]),
            owner(addr(0xc), &[("2", 1)]),
        ],
        ..FakeCollection::default()
    }
}

#[tokio::test]
async fn test_collection_counts_and_order() {
    let (worker, _) = worker(
        Arc::new(sample_collection()),
        Arc::new(FakeWallet::default()),
        Arc::new(FakeResolver::default()),
        fast_policy(),
    );

    let events = run(&worker, RuntimeCommand::FetchCollection { generation: 1 }).await;

    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            RuntimeEvent::Progress { loaded, total, .. } => Some((*loaded, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&(3, 3)));

    let Some(RuntimeEvent::CollectionReady { generation, items }) = events.last() else {
        panic!("expected CollectionReady, got {events:?}");
    };
    assert_eq!(*generation, 1);
    let ids: Vec<&str> = items.iter().map(|i| i.token_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
    let counts: HashMap<&str, u64> = items
        .iter()
        .map(|i| (i.token_id.as_str(), i.holder_count))
        .collect();
    assert_eq!(counts, HashMap::from([("1", 2), ("2", 2), ("3", 1)]));
    assert_eq!(items[0].date, "2024-03-02");
}

#[tokio::test]
async fn test_leaderboard_then_name_batches() {
    let owners = (1..=7u8).map(|b| owner(addr(b), &[("1", b as u64)])).collect();
    let collection = FakeCollection {
        owners,
        ..FakeCollection::default()
    };
    let resolver = FakeResolver::with_names(&[(addr(7), "whale.eth"), (addr(1), "minnow.eth")]);
    let (worker, names) = worker(
        Arc::new(collection),
        Arc::new(FakeWallet::default()),
        Arc::new(resolver),
        fast_policy(),
    );

    let events = run(&worker, RuntimeCommand::FetchLeaderboard { generation: 4 }).await;
    assert_eq!(events.len(), 4, "{events:?}");

    let RuntimeEvent::LeaderboardReady { generation, holders } = &events[0] else {
        panic!("expected LeaderboardReady first, got {:?}", events[0]);
    };
    assert_eq!(*generation, 4);
    let totals: Vec<u64> = holders.iter().map(|h| h.total_count).collect();
    assert_eq!(totals, vec![7, 6, 5, 4, 3, 2, 1]);
    assert!(holders.iter().all(|h| h.name.is_none()));

    let batch_sizes: Vec<usize> = events[1..3]
        .iter()
        .map(|e| match e {
            RuntimeEvent::NamesResolved { screen, names, .. } => {
                assert_eq!(*screen, Screen::Leaderboard);
                names.len()
            }
            other => panic!("expected NamesResolved, got {other:?}"),
        })
        .collect();
    assert_eq!(batch_sizes, vec![5, 2]);
    assert!(matches!(
        events[3],
        RuntimeEvent::NamesComplete {
            screen: Screen::Leaderboard,
            generation: 4
        }
    ));
    assert_eq!(names.peek(&addr(7)), CachedName::Resolved(Some("whale.eth".into())));
}

#[tokio::test]
async fn test_cached_names_spliced_without_lookups() {
    let collection = FakeCollection {
        owners: vec![owner(addr(1), &[("1", 2)]), owner(addr(2), &[("1", 1)])],
        ..FakeCollection::default()
    };
    let resolver = Arc::new(FakeResolver::with_names(&[(addr(1), "alice.eth")]));
    let (worker, _) = worker(
        Arc::new(collection),
        Arc::new(FakeWallet::default()),
        resolver.clone(),
        fast_policy(),
    );

    run(&worker, RuntimeCommand::FetchLeaderboard { generation: 1 }).await;
    assert_eq!(resolver.lookup_count(), 2);

    let events = run(&worker, RuntimeCommand::FetchLeaderboard { generation: 2 }).await;
    assert_eq!(resolver.lookup_count(), 2);
    assert_eq!(events.len(), 2, "{events:?}");

    let RuntimeEvent::LeaderboardReady { holders, .. } = &events[0] else {
        panic!("expected LeaderboardReady, got {:?}", events[0]);
    };
    assert_eq!(holders[0].name.as_deref(), Some("alice.eth"));
    assert_eq!(holders[1].name, None);
    assert!(matches!(events[1], RuntimeEvent::NamesComplete { generation: 2, .. }));
}

#[tokio::test]
async fn test_owners_of_token() {
    let collection = Arc::new(sample_collection());
    let resolver = Arc::new(FakeResolver::with_names(&[(addr(0xb), "bee.eth")]));
    let (worker, _) = worker(
        collection.clone(),
        Arc::new(FakeWallet::default()),
        resolver,
        fast_policy(),
    );

    let events = run(
        &worker,
        RuntimeCommand::FetchOwners {
            generation: 1,
            token_id: "1".into(),
        },
    )
    .await;

    let RuntimeEvent::OwnersReady { token_id, owners, .. } = &events[0] else {
        panic!("expected OwnersReady, got {:?}", events[0]);
    };
    assert_eq!(token_id, "1");
    let rows: Vec<(u8, u64)> = owners.iter().map(|o| (o.holder.as_slice()[0], o.balance)).collect();
    assert_eq!(rows, vec![(0xa, 3), (0xb, 4)]);

    let RuntimeEvent::NamesResolved { names, .. } = &events[1] else {
        panic!("expected NamesResolved, got {:?}", events[1]);
    };
    assert!(names.contains(&(addr(0xb), Some("bee.eth".to_string()))));
    assert_eq!(collection.owner_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_provider_failure_reported() {
    let collection = FakeCollection {
        fail_owners: AtomicBool::new(true),
        ..sample_collection()
    };
    let (worker, _) = worker(
        Arc::new(collection),
        Arc::new(FakeWallet::default()),
        Arc::new(FakeResolver::default()),
        fast_policy(),
    );

    let events = run(&worker, RuntimeCommand::FetchCollection { generation: 9 }).await;
    let [RuntimeEvent::Failed {
        screen,
        generation,
        message,
    }] = events.as_slice()
    else {
        panic!("expected a single Failed event, got {events:?}");
    };
    assert_eq!(*screen, Screen::Collection);
    assert_eq!(*generation, 9);
    assert!(message.contains("Failed to load collection"));
    assert!(message.contains("503"));
}

fn wallet_with(holder: u8, nfts: Vec<OwnedNft>) -> FakeWallet {
    FakeWallet {
        holdings: HashMap::from([(addr(holder), nfts)]),
    }
}

#[tokio::test]
async fn test_wallet_by_name() {
    let wallet = wallet_with(
        0xd,
        vec![
            OwnedNft {
                token: token("12", "Late Call", "2024-06-01"),
                balance: 1,
            },
            OwnedNft {
                token: token("4", "Early Call", "2024-01-01"),
                balance: 3,
            },
        ],
    );
    let resolver = Arc::new(FakeResolver::with_names(&[(addr(0xd), "dana.eth")]));
    let (worker, _) = worker(
        Arc::new(FakeCollection::default()),
        Arc::new(wallet),
        resolver.clone(),
        fast_policy(),
    );

    let events = run(
        &worker,
        RuntimeCommand::SearchWallet {
            generation: 1,
            input: "dana.eth".into(),
        },
    )
    .await;

    let [RuntimeEvent::WalletReady { owner, tokens, .. }] = events.as_slice() else {
        panic!("expected WalletReady, got {events:?}");
    };
    assert_eq!(owner.address, Some(addr(0xd)));
    assert_eq!(owner.name.as_deref(), Some("dana.eth"));
    assert_eq!(owner.total_balance, 4);
    let ids: Vec<&str> = tokens.iter().map(|t| t.token_id.as_str()).collect();
    assert_eq!(ids, vec!["4", "12"]);
    // Forward resolution already named the wallet
    assert_eq!(resolver.lookup_count(), 0);
}

#[tokio::test]
async fn test_wallet_by_address_uses_reverse_name() {
    let resolver = Arc::new(FakeResolver::with_names(&[(addr(0xd), "dana.eth")]));
    let (worker, names) = worker(
        Arc::new(FakeCollection::default()),
        Arc::new(FakeWallet::default()),
        resolver,
        fast_policy(),
    );

    let input = "  0x0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D0D  ".to_string();
    let events = run(&worker, RuntimeCommand::SearchWallet { generation: 1, input }).await;

    let [RuntimeEvent::WalletReady { owner, tokens, .. }] = events.as_slice() else {
        panic!("expected WalletReady, got {events:?}");
    };
    assert_eq!(owner.name.as_deref(), Some("dana.eth"));
    assert!(tokens.is_empty());
    assert_eq!(owner.total_balance, 0);
    assert!(names.has(&addr(0xd)));
}

#[tokio::test]
async fn test_wallet_unknown_name_is_empty_result() {
    let (worker, _) = worker(
        Arc::new(FakeCollection::default()),
        Arc::new(FakeWallet::default()),
        Arc::new(FakeResolver::default()),
        fast_policy(),
    );

    let events = run(
        &worker,
        RuntimeCommand::SearchWallet {
            generation: 1,
            input: "nobody.eth".into(),
        },
    )
    .await;

    let [RuntimeEvent::WalletReady { owner, tokens, .. }] = events.as_slice() else {
        panic!("expected WalletReady, got {events:?}");
    };
    assert_eq!(owner.address, None);
    assert_eq!(owner.input, "nobody.eth");
    assert!(tokens.is_empty());
}

#[tokio::test]
async fn test_wallet_malformed_address_fails() {
    let (worker, _) = worker(
        Arc::new(FakeCollection::default()),
        Arc::new(FakeWallet::default()),
        Arc::new(FakeResolver::default()),
        fast_policy(),
    );

    let events = run(
        &worker,
        RuntimeCommand::SearchWallet {
            generation: 3,
            input: "0x1234".into(),
        },
    )
    .await;

    let [RuntimeEvent::Failed { screen, message, .. }] = events.as_slice() else {
        panic!("expected Failed, got {events:?}");
    };
    assert_eq!(*screen, Screen::Wallet);
    assert_eq!(message, "Invalid address: 0x1234");
}
