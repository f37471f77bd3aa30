use tokio_stream::Stream;

use crate::contract::ContractConfig;

/// Asserts that the next config on the stream equals `expected`.
#[macro_export]
macro_rules! assert_next {
    ($stream: expr, $expected: expr) => {
        $crate::assert_next!($stream, $expected, timeout = 5)
    };
    ($stream: expr, $expected: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        let expected = $expected;
        match message {
            std::option::Option::Some(config) => {
                assert_eq!(config, expected, "Expected {:?}, got {:?}", expected, config);
            }
            std::option::Option::None => {
                panic!("Expected {:?}, but channel was closed", expected);
            }
        }
    };
}

#[macro_export]
macro_rules! assert_closed {
    ($stream: expr) => {
        $crate::assert_closed!($stream, timeout = 5)
    };
    ($stream: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        assert!(message.is_none(), "Expected closed stream, got {:?}", message)
    };
}

/// Asserts that no config is waiting on the stream and gives the stream back.
#[macro_export]
macro_rules! assert_empty {
    ($stream: expr) => {{
        let inner = $stream.into_inner();
        assert!(inner.is_empty(), "Stream should have no pending messages");
        tokio_stream::wrappers::ReceiverStream::new(inner)
    }};
}

/// Asserts that the stream yields nothing for `millis` milliseconds, neither a config nor the
/// end of the stream.
#[macro_export]
macro_rules! assert_quiet {
    ($stream: expr) => {
        $crate::assert_quiet!($stream, millis = 100)
    };
    ($stream: expr, millis = $millis: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_millis($millis),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await;
        assert!(message.is_err(), "Expected no stream activity, got {:?}", message)
    };
}

/// Asserts that the stream yields exactly `expected`, in order, and nothing else within the
/// quiet window that follows.
///
/// # Example
///
/// ```ignore
/// assert_config_sequence!(stream, &[contract_config(address, 1), contract_config(address, 2)]);
/// ```
///
/// # Panics
///
/// * **Timeout**: The next expected config does not arrive within the timeout (default 5
///   seconds, configurable via `timeout = N`).
/// * **Wrong config**: The stream yields a config other than the next expected one.
/// * **Stream closed early**: The stream ends before all expected configs arrive.
/// * **Extra configs**: The stream yields another config after the sequence completes.
#[macro_export]
macro_rules! assert_config_sequence {
    ($stream: expr, $configs: expr) => {
        $crate::assert_config_sequence!($stream, $configs, timeout = 5)
    };
    ($stream: expr, $configs: expr, timeout = $secs: expr) => {
        $crate::test_utils::macros::assert_config_sequence(&mut $stream, $configs, $secs).await
    };
}

#[allow(clippy::missing_panics_doc)]
pub async fn assert_config_sequence<'a, S: Stream<Item = ContractConfig> + Unpin>(
    stream: &mut S,
    expected: impl IntoIterator<Item = &'a ContractConfig>,
    timeout_secs: u64,
) {
    let mut remaining = expected.into_iter();
    let start = std::time::Instant::now();
    let timeout_duration = std::time::Duration::from_secs(timeout_secs);

    while let Some(expected) = remaining.next() {
        let time_left = timeout_duration.saturating_sub(start.elapsed());
        let message = tokio::time::timeout(time_left, tokio_stream::StreamExt::next(stream))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for config {:?}", expected.config_digest));

        match message {
            Some(config) => assert_eq!(
                &config,
                expected,
                "\nRemaining: {:#?}\n",
                remaining.map(|config| config.config_digest).collect::<Vec<_>>()
            ),
            None => panic!(
                "Stream closed while still expecting: {:?}",
                std::iter::once(expected)
                    .chain(remaining)
                    .map(|config| config.config_digest)
                    .collect::<Vec<_>>()
            ),
        }
    }

    let extra = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        tokio_stream::StreamExt::next(stream),
    )
    .await;
    if let Ok(Some(config)) = extra {
        panic!("Received more configs than expected, next: {:?}", config.config_digest);
    }
}
