#![allow(clippy::unwrap_used)]

// Integration tests for the poll coordinator, driven by a scripted
// in-memory controller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;

use omnilogic_core::model::{FilterState, RelayState};
use omnilogic_core::{
    ApiError, Command, CommandRequest, CommandResult, Coordinator, CoordinatorConfig, CoreError,
    DeviceTelemetry, EquipmentValue, OmniApi, OmniType, PollState, SystemId,
};

// ── Helpers ─────────────────────────────────────────────────────────

const CONFIG: &str = r"<?xml version='1.0' encoding='UTF-8'?>
<MSPConfig>
  <System><Msp-Vsp-Speed-Format>Percent</Msp-Vsp-Speed-Format></System>
  <Backyard>
    <System-Id>0</System-Id>
    <Name>Backyard</Name>
    <Relay>
      <System-Id>42</System-Id>
      <Name>Landscape Lights</Name>
      <Type>RLY_HIGH_VOLTAGE_RELAY</Type>
    </Relay>
    <Body-of-water>
      <System-Id>5</System-Id>
      <Name>Pool</Name>
      <Type>BOW_POOL</Type>
      <Filter>
        <System-Id>10</System-Id>
        <Name>Filter Pump</Name>
        <Filter-Type>FMT_VARIABLE_SPEED_PUMP</Filter-Type>
      </Filter>
    </Body-of-water>
  </Backyard>
</MSPConfig>";

const TELEMETRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<STATUS version="1.11">
  <Backyard systemId="0" state="1" airTemp="70"/>
  <BodyOfWater systemId="5" waterTemp="65535" flow="1"/>
  <Relay systemId="42" relayState="0" whyOn="0"/>
  <Filter systemId="10" filterState="1" filterSpeed="50"/>
</STATUS>"#;

/// A controller that replays scripted payloads and records commands.
struct ScriptedApi {
    configuration: Mutex<Result<Bytes, ApiError>>,
    telemetry: Mutex<Result<Bytes, ApiError>>,
    send_result: Mutex<Result<(), ApiError>>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    sent: Mutex<Vec<(Option<SystemId>, SystemId, CommandRequest)>>,
}

impl ScriptedApi {
    fn new(configuration: &'static str, telemetry: &'static str) -> Self {
        Self {
            configuration: Mutex::new(Ok(Bytes::from_static(configuration.as_bytes()))),
            telemetry: Mutex::new(Ok(Bytes::from_static(telemetry.as_bytes()))),
            send_result: Mutex::new(Ok(())),
            delay: Mutex::new(None),
            fetches: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn fail_configuration(&self, error: ApiError) {
        *self.configuration.lock().unwrap() = Err(error);
    }

    fn fail_sends(&self, error: ApiError) {
        *self.send_result.lock().unwrap() = Err(error);
    }

    fn stall_for(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn sent(&self) -> Vec<(Option<SystemId>, SystemId, CommandRequest)> {
        self.sent.lock().unwrap().clone()
    }
}

impl OmniApi for ScriptedApi {
    async fn fetch_configuration(&self) -> Result<Bytes, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.configuration.lock().unwrap().clone()
    }

    async fn fetch_telemetry(&self) -> Result<Bytes, ApiError> {
        self.telemetry.lock().unwrap().clone()
    }

    async fn send_command(
        &self,
        bow_id: Option<SystemId>,
        system_id: SystemId,
        request: CommandRequest,
    ) -> Result<(), ApiError> {
        let result = self.send_result.lock().unwrap().clone();
        if result.is_ok() {
            self.sent.lock().unwrap().push((bow_id, system_id, request));
        }
        result
    }
}

fn coordinator() -> Coordinator<ScriptedApi> {
    Coordinator::new(
        CoordinatorConfig::default(),
        ScriptedApi::new(CONFIG, TELEMETRY),
    )
}

fn notification_counter(coordinator: &Coordinator<ScriptedApi>) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    coordinator.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

// ── Refresh cycle ───────────────────────────────────────────────────

#[tokio::test]
async fn builds_index_from_both_payloads() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    let index = coordinator.index();
    assert_eq!(index.len(), 4);
    assert_eq!(index.get(5).unwrap().omni_type(), OmniType::BodyOfWater);

    let filter = index.get(10).unwrap();
    assert_eq!(filter.msp_config.bow_id, Some(5));
    let Some(DeviceTelemetry::Filter(telemetry)) = &filter.telemetry else {
        panic!("expected filter telemetry");
    };
    assert_eq!(telemetry.state, FilterState::On);
    assert_eq!(telemetry.speed, 50);

    assert!(coordinator.last_update_success());
    assert_eq!(*coordinator.state().borrow(), PollState::Idle);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn failed_fetch_keeps_previous_index() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    let before = coordinator.index();

    coordinator.api().fail_configuration(ApiError::Timeout);
    let err = coordinator.refresh().await.unwrap_err();

    let CoreError::UpdateFailed { source } = &err else {
        panic!("expected UpdateFailed, got {err:?}");
    };
    assert!(matches!(**source, CoreError::Api(ApiError::Timeout)));
    assert!(Arc::ptr_eq(&before, &coordinator.index()));

    let status = coordinator.status().borrow().clone();
    assert!(!status.last_update_success);
    assert_eq!(status.consecutive_failures, 1);
    assert!(status.last_success_at.is_some());
    coordinator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stalled_cycle_times_out() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    let before = coordinator.index();

    coordinator.api().stall_for(Duration::from_secs(60));
    let err = coordinator.refresh().await.unwrap_err();

    let CoreError::UpdateFailed { source } = &err else {
        panic!("expected UpdateFailed, got {err:?}");
    };
    assert!(matches!(**source, CoreError::Timeout { timeout } if timeout == Duration::from_secs(30)));
    assert_eq!(*before, *coordinator.index());
    assert_eq!(*coordinator.state().borrow(), PollState::Idle);
    coordinator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn sub_second_budget_is_reported_exactly() {
    let coordinator = Coordinator::new(
        CoordinatorConfig {
            update_timeout: Duration::from_millis(500),
            ..CoordinatorConfig::default()
        },
        ScriptedApi::new(CONFIG, TELEMETRY),
    );
    coordinator.api().stall_for(Duration::from_secs(2));

    let err = coordinator.refresh().await.unwrap_err();
    assert!(err.to_string().contains("500ms"), "{err}");
}

#[tokio::test]
async fn malformed_payload_fails_start() {
    let coordinator = Coordinator::new(
        CoordinatorConfig::default(),
        ScriptedApi::new("<MSPConfig><Backyard>", TELEMETRY),
    );
    let err = coordinator.start().await.unwrap_err();
    let CoreError::UpdateFailed { source } = &err else {
        panic!("expected UpdateFailed, got {err:?}");
    };
    assert!(matches!(**source, CoreError::Parse { .. }));
    assert!(coordinator.index().is_empty());
}

#[tokio::test]
async fn recovers_on_next_successful_cycle() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    coordinator
        .api()
        .fail_configuration(ApiError::Connection("refused".into()));
    assert!(coordinator.refresh().await.is_err());
    assert!(coordinator.refresh().await.is_err());
    assert_eq!(coordinator.status().borrow().consecutive_failures, 2);

    *coordinator.api().configuration.lock().unwrap() =
        Ok(Bytes::from_static(CONFIG.as_bytes()));
    coordinator.refresh().await.unwrap();
    let status = coordinator.status().borrow().clone();
    assert!(status.last_update_success);
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_error.is_none());
    coordinator.shutdown().await;
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn polls_only_while_someone_listens() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    assert_eq!(coordinator.api().fetches(), 1);

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(coordinator.api().fetches(), 1);

    let calls = notification_counter(&coordinator);
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(coordinator.api().fetches(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    coordinator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn live_stream_keeps_polling_alive() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    let mut stream = coordinator.watch();
    let first = stream.current().clone();
    let next = stream.changed().await.unwrap();
    assert_eq!(coordinator.api().fetches(), 2);
    assert!(!Arc::ptr_eq(&first, &next));

    drop(stream);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn stopped_coordinator_refuses_work() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    coordinator.shutdown().await;

    assert!(matches!(
        coordinator.refresh().await,
        Err(CoreError::CoordinatorStopped)
    ));
    assert!(matches!(
        coordinator.dispatch_command(42, Command::TurnOn).await,
        Err(CoreError::CoordinatorStopped)
    ));
}

// ── Commands ────────────────────────────────────────────────────────

fn relay_state(coordinator: &Coordinator<ScriptedApi>, system_id: SystemId) -> RelayState {
    match &coordinator.index().get(system_id).unwrap().telemetry {
        Some(DeviceTelemetry::Relay(t)) => t.state,
        other => panic!("expected relay telemetry, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_applies_prediction_immediately() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    let calls = notification_counter(&coordinator);
    assert_eq!(relay_state(&coordinator, 42), RelayState::Off);

    let result = coordinator
        .dispatch_command(42, Command::TurnOn)
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Applied);
    assert_eq!(relay_state(&coordinator, 42), RelayState::On);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        coordinator.api().sent(),
        vec![(
            None,
            42,
            CommandRequest::SetEquipment {
                is_on: EquipmentValue::On(true)
            }
        )]
    );
    coordinator.shutdown().await;
}

#[tokio::test]
async fn dispatch_passes_owning_body_of_water() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    coordinator
        .dispatch_command(10, Command::SetSpeed { percent: 75 })
        .await
        .unwrap();

    let sent = coordinator.api().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, Some(5));
    let index = coordinator.index();
    let Some(DeviceTelemetry::Filter(filter)) = &index.get(10).unwrap().telemetry
    else {
        panic!("expected filter telemetry");
    };
    assert_eq!(filter.speed, 75);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn unknown_device_is_not_sent() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    let before = coordinator.index();

    let err = coordinator
        .dispatch_command(9999, Command::TurnOn)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::UnknownDevice { system_id: 9999 }));
    assert!(coordinator.api().sent().is_empty());
    assert!(Arc::ptr_eq(&before, &coordinator.index()));
    coordinator.shutdown().await;
}

#[tokio::test]
async fn failed_send_skips_prediction() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();
    let calls = notification_counter(&coordinator);
    let before = coordinator.index();

    coordinator
        .api()
        .fail_sends(ApiError::Connection("socket closed".into()));
    let err = coordinator
        .dispatch_command(42, Command::TurnOn)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::CommandDispatch {
            system_id: 42,
            source: ApiError::Connection(_)
        }
    ));
    assert!(Arc::ptr_eq(&before, &coordinator.index()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn unsupported_command_is_rejected_before_sending() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    let err = coordinator
        .dispatch_command(42, Command::SetHeaterTemperature { temperature: 80 })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::WrongDeviceKind { system_id: 42, .. }));
    assert!(coordinator.api().sent().is_empty());
    coordinator.shutdown().await;
}

#[tokio::test]
async fn diagnostics_carry_last_payloads() {
    let coordinator = coordinator();
    coordinator.start().await.unwrap();

    let diagnostics = coordinator.diagnostics();
    assert_eq!(diagnostics.entries, 4);
    assert!(
        diagnostics
            .configuration_payload
            .as_deref()
            .unwrap()
            .contains("<MSPConfig>")
    );
    assert!(diagnostics.telemetry_payload.is_some());
    assert!(diagnostics.status.last_update_success);
    assert!(diagnostics.to_json_pretty().unwrap().contains("\"entries\": 4"));
    coordinator.shutdown().await;
}
