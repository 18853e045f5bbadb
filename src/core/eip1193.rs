//! Wallet connection logic using web-sys.
//!
//! Implements the capability traits over MetaMask (EIP-1193) through
//! direct JavaScript interop via the Reflect API. Contract calls are
//! plain JSON-RPC requests (`eth_call`, `eth_sendTransaction`) routed
//! through the wallet.

use std::str::FromStr;

use alloy_primitives::{Address, B256};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::config::{CONFIRMATION_TIMEOUT_MS, RECEIPT_POLL_INTERVAL_MS, RPC_TIMEOUT_MS};
use crate::core::abi;
use crate::core::error::WalletError;
use crate::core::network::parse_chain_id;
use crate::core::provider::{
    ConfirmationReceipt, Listener, PauseContract, PendingTransaction, WalletEvent,
    WalletEventKind, WalletProvider,
};
use crate::utils::{RaceResult, dom, error_message, race_with_timeout};

/// Get the window.ethereum object injected by MetaMask.
fn get_ethereum() -> Result<Object, WalletError> {
    let window = dom::window().ok_or(WalletError::NoWindow)?;
    Reflect::get(&window, &"ethereum".into())
        .ok()
        .and_then(|v| v.dyn_into::<Object>().ok())
        .ok_or(WalletError::NotInstalled)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, WalletError> {
    serde_wasm_bindgen::to_value(value).map_err(|_| WalletError::RequestCreationFailed)
}

/// Parse account strings, skipping anything that is not an address.
fn parse_accounts<I, S>(raw: I) -> Vec<Address>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| Address::from_str(s.as_ref()).ok())
        .collect()
}

/// Decode the payload of a provider event.
fn decode_event(kind: WalletEventKind, payload: &JsValue) -> Option<WalletEvent> {
    match kind {
        WalletEventKind::AccountsChanged => {
            if !Array::is_array(payload) {
                return None;
            }
            let raw: Vec<String> = Array::from(payload)
                .iter()
                .filter_map(|v| v.as_string())
                .collect();
            Some(WalletEvent::AccountsChanged(parse_accounts(raw)))
        }
        WalletEventKind::ChainChanged => payload
            .as_string()
            .and_then(|s| parse_chain_id(&s))
            .or_else(|| payload.as_f64().map(|n| n as u64))
            .map(WalletEvent::ChainChanged),
        WalletEventKind::Connect => {
            let chain_id = Reflect::get(payload, &"chainId".into())
                .ok()
                .and_then(|v| v.as_string())
                .and_then(|s| parse_chain_id(&s));
            Some(WalletEvent::Connect { chain_id })
        }
        WalletEventKind::Disconnect => Some(WalletEvent::Disconnect),
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Handle to the injected `window.ethereum` object.
#[derive(Clone)]
pub struct Eip1193Provider {
    ethereum: Object,
}

impl Eip1193Provider {
    /// Look up the injected provider.
    pub fn detect() -> Result<Self, WalletError> {
        Ok(Self {
            ethereum: get_ethereum()?,
        })
    }

    fn method(&self, name: &str) -> Result<Function, WalletError> {
        Reflect::get(&self.ethereum, &name.into())
            .map_err(|_| WalletError::RequestCreationFailed)?
            .dyn_into::<Function>()
            .map_err(|_| WalletError::RequestCreationFailed)
    }

    /// Call ethereum.request({ method, params })
    fn request_promise(&self, method: &str, params: Option<Array>) -> Result<Promise, WalletError> {
        let args = Object::new();
        Reflect::set(&args, &"method".into(), &method.into())
            .map_err(|_| WalletError::RequestCreationFailed)?;
        if let Some(params) = params {
            Reflect::set(&args, &"params".into(), &params)
                .map_err(|_| WalletError::RequestCreationFailed)?;
        }

        let promise: Promise = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(|_| WalletError::RequestCreationFailed)?
            .into();
        Ok(promise)
    }

    /// Interactive request: waits as long as the user needs.
    async fn request(&self, method: &str, params: Option<Array>) -> Result<JsValue, WalletError> {
        JsFuture::from(self.request_promise(method, params)?)
            .await
            .map_err(|e| WalletError::RequestRejected(error_message(&e)))
    }

    /// Non-interactive request bounded by [`RPC_TIMEOUT_MS`].
    async fn request_with_timeout(
        &self,
        method: &str,
        params: Option<Array>,
    ) -> Result<JsValue, WalletError> {
        match race_with_timeout(self.request_promise(method, params)?, RPC_TIMEOUT_MS).await {
            RaceResult::Completed(result) => Ok(result),
            RaceResult::TimedOut => Err(WalletError::Timeout),
            RaceResult::Error(msg) => Err(WalletError::RequestRejected(msg)),
        }
    }
}

/// A listener registered with `ethereum.on`. Owns the closure so the
/// same function object can be passed to `removeListener`.
pub struct Eip1193Subscription {
    kind: WalletEventKind,
    closure: Closure<dyn FnMut(JsValue)>,
}

impl WalletProvider for Eip1193Provider {
    type Contract = Eip1193Contract;
    type Subscription = Eip1193Subscription;

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let result = self.request("eth_requestAccounts", None).await?;
        if !Array::is_array(&result) {
            return Err(WalletError::InvalidResponse(
                "eth_requestAccounts did not return an array".to_string(),
            ));
        }
        let raw: Vec<String> = Array::from(&result)
            .iter()
            .filter_map(|v| v.as_string())
            .collect();
        Ok(parse_accounts(raw))
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let result = self.request_with_timeout("eth_chainId", None).await?;
        result
            .as_string()
            .and_then(|s| parse_chain_id(&s))
            .ok_or_else(|| WalletError::InvalidResponse(format!("bad chain id {:?}", result)))
    }

    fn contract(&self, address: Address, signer: Address) -> Eip1193Contract {
        Eip1193Contract {
            provider: self.clone(),
            address,
            signer,
        }
    }

    fn subscribe(
        &self,
        kind: WalletEventKind,
        listener: Listener,
    ) -> Result<Eip1193Subscription, WalletError> {
        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            match decode_event(kind, &payload) {
                Some(event) => listener(event),
                None => log::warn!("ignoring malformed {} payload", kind.event_name()),
            }
        }) as Box<dyn FnMut(JsValue)>);

        self.method("on")?
            .call2(&self.ethereum, &kind.event_name().into(), closure.as_ref())
            .map_err(|_| WalletError::RequestCreationFailed)?;

        Ok(Eip1193Subscription { kind, closure })
    }

    fn unsubscribe(&self, subscription: Eip1193Subscription) -> Result<(), WalletError> {
        self.method("removeListener")?
            .call2(
                &self.ethereum,
                &subscription.kind.event_name().into(),
                subscription.closure.as_ref(),
            )
            .map_err(|_| WalletError::RequestCreationFailed)?;
        Ok(())
    }
}

// ============================================================================
// Contract
// ============================================================================

/// `eth_call` / `eth_sendTransaction` parameter object.
#[derive(Debug, Serialize)]
struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    to: String,
    data: String,
}

/// Contract handle that signs through the injected wallet.
#[derive(Clone)]
pub struct Eip1193Contract {
    provider: Eip1193Provider,
    address: Address,
    signer: Address,
}

impl PauseContract for Eip1193Contract {
    type Transaction = Eip1193Transaction;

    fn address(&self) -> Address {
        self.address
    }

    fn signer(&self) -> Address {
        self.signer
    }

    async fn read_pause_state(&self) -> Result<bool, WalletError> {
        let call = CallRequest {
            from: None,
            to: self.address.to_string(),
            data: abi::to_hex_data(&abi::encode_pause_state_call()),
        };
        let params = Array::of2(&to_js(&call)?, &"latest".into());
        let result = self.provider.request_with_timeout("eth_call", Some(params)).await?;
        let raw = result
            .as_string()
            .ok_or_else(|| WalletError::InvalidResponse("eth_call returned no data".to_string()))?;
        abi::decode_pause_state(&abi::from_hex_data(&raw)?)
    }

    async fn set_pause_state(&self, paused: bool) -> Result<Eip1193Transaction, WalletError> {
        let tx = CallRequest {
            from: Some(self.signer.to_string()),
            to: self.address.to_string(),
            data: abi::to_hex_data(&abi::encode_set_pause_call(paused)),
        };
        let params = Array::of1(&to_js(&tx)?);
        let result = self.provider.request("eth_sendTransaction", Some(params)).await?;
        let tx_hash = result
            .as_string()
            .and_then(|s| B256::from_str(&s).ok())
            .ok_or_else(|| {
                WalletError::InvalidResponse(format!("bad transaction hash {:?}", result))
            })?;

        Ok(Eip1193Transaction {
            provider: self.provider.clone(),
            tx_hash,
        })
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// Subset of `eth_getTransactionReceipt` the client looks at.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    block_number: Option<String>,
    /// `0x1` success, `0x0` revert; absent before Byzantium.
    #[serde(default)]
    status: Option<String>,
}

impl RpcReceipt {
    fn into_confirmation(self, tx_hash: B256) -> ConfirmationReceipt {
        ConfirmationReceipt {
            tx_hash,
            block_number: self.block_number.as_deref().and_then(parse_chain_id),
            succeeded: self.status.as_deref() != Some("0x0"),
        }
    }
}

/// Transaction accepted by the wallet, confirmed by polling its receipt.
pub struct Eip1193Transaction {
    provider: Eip1193Provider,
    tx_hash: B256,
}

impl PendingTransaction for Eip1193Transaction {
    fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    async fn await_confirmation(self) -> Result<ConfirmationReceipt, WalletError> {
        let attempts = CONFIRMATION_TIMEOUT_MS / RECEIPT_POLL_INTERVAL_MS;
        let hash = JsValue::from_str(&self.tx_hash.to_string());

        for _ in 0..attempts {
            let params = Array::of1(&hash);
            match self
                .provider
                .request_with_timeout("eth_getTransactionReceipt", Some(params))
                .await
            {
                Ok(result) if !result.is_null() && !result.is_undefined() => {
                    let receipt: RpcReceipt = serde_wasm_bindgen::from_value(result)
                        .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;
                    return Ok(receipt.into_confirmation(self.tx_hash));
                }
                // Not mined yet, or a slow poll: try again.
                Ok(_) | Err(WalletError::Timeout) => {}
                Err(e) => return Err(e),
            }
            TimeoutFuture::new(RECEIPT_POLL_INTERVAL_MS).await;
        }

        log::warn!(
            "no receipt for {} after {} ms",
            self.tx_hash,
            CONFIRMATION_TIMEOUT_MS
        );
        Err(WalletError::Timeout)
    }
}
