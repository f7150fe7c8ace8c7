//! PKCS#11 token session using `cryptoki`.

use cryptoki::context::{CInitializeArgs, Pkcs11};
use cryptoki::error::{Error as CryptokiError, RvError};
use cryptoki::mechanism::Mechanism;
use cryptoki::object::{Attribute, AttributeType, ObjectClass, ObjectHandle};
use cryptoki::session::{Session, UserType};
use cryptoki::types::AuthPin;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::token::{
    error::TokenError, model::Pkcs11Params, TokenMechanism, TokenObjectHandle, TokenSession,
};

struct SessionState {
    session: Session,
    // index is the value handed out as `TokenObjectHandle`
    objects: Vec<ObjectHandle>,
}

/// Session on a PKCS#11 token, bound to one certificate.
///
/// The library session is not `Sync`, so calls are serialized.
pub struct Pkcs11Session {
    certificate_label: String,
    state: Mutex<SessionState>,
    _context: Pkcs11,
}

impl Pkcs11Session {
    pub fn open(params: &Pkcs11Params) -> Result<Self, TokenError> {
        trace!(
            "Loading PKCS#11 library: {}",
            params.library_path.display()
        );
        let context = Pkcs11::new(&params.library_path).map_err(map_cryptoki_error)?;
        context
            .initialize(CInitializeArgs::OsThreads)
            .map_err(map_cryptoki_error)?;

        let slots = context
            .get_slots_with_token()
            .map_err(map_cryptoki_error)?;
        let slot = match params.slot_id {
            Some(slot_id) => slots
                .into_iter()
                .find(|slot| slot.id() == slot_id)
                .ok_or(TokenError::NotPresent)?,
            None => slots.into_iter().next().ok_or(TokenError::NotPresent)?,
        };
        debug!("Using PKCS#11 slot {}", slot.id());

        let session = context.open_ro_session(slot).map_err(map_cryptoki_error)?;
        if let Some(pin) = &params.pin {
            let auth_pin = AuthPin::new(pin.as_str().to_owned());
            session
                .login(UserType::User, Some(&auth_pin))
                .map_err(map_cryptoki_error)?;
        }

        info!(
            certificate_label = %params.certificate_label,
            "PKCS#11 session opened"
        );

        Ok(Self {
            certificate_label: params.certificate_label.clone(),
            state: Mutex::new(SessionState {
                session,
                objects: Vec::new(),
            }),
            _context: context,
        })
    }

    fn object(state: &SessionState, key: TokenObjectHandle) -> Result<ObjectHandle, TokenError> {
        usize::try_from(key.0)
            .ok()
            .and_then(|index| state.objects.get(index).copied())
            .ok_or_else(|| TokenError::KeyNotFound(format!("object {}", key.0)))
    }
}

impl TokenSession for Pkcs11Session {
    fn find_private_key(&self) -> Result<TokenObjectHandle, TokenError> {
        let mut state = self.state.lock();

        let certificate = state
            .session
            .find_objects(&[
                Attribute::Class(ObjectClass::CERTIFICATE),
                Attribute::Label(self.certificate_label.as_bytes().to_vec()),
            ])
            .map_err(map_cryptoki_error)?
            .into_iter()
            .next()
            .ok_or_else(|| TokenError::KeyNotFound(self.certificate_label.clone()))?;

        let id = state
            .session
            .get_attributes(certificate, &[AttributeType::Id])
            .map_err(map_cryptoki_error)?
            .into_iter()
            .find_map(|attribute| match attribute {
                Attribute::Id(id) => Some(id),
                _ => None,
            })
            .ok_or_else(|| TokenError::KeyNotFound(self.certificate_label.clone()))?;

        let private_key = state
            .session
            .find_objects(&[
                Attribute::Class(ObjectClass::PRIVATE_KEY),
                Attribute::Id(id),
            ])
            .map_err(map_cryptoki_error)?
            .into_iter()
            .next()
            .ok_or_else(|| TokenError::KeyNotFound(self.certificate_label.clone()))?;

        let index = match state.objects.iter().position(|o| *o == private_key) {
            Some(index) => index,
            None => {
                state.objects.push(private_key);
                state.objects.len() - 1
            }
        };
        trace!("Resolved private key for {}", self.certificate_label);

        Ok(TokenObjectHandle(index as u64))
    }

    fn modulus_length(&self, key: TokenObjectHandle) -> Result<usize, TokenError> {
        let state = self.state.lock();
        let object = Self::object(&state, key)?;

        let modulus = state
            .session
            .get_attributes(object, &[AttributeType::Modulus])
            .map_err(map_cryptoki_error)?
            .into_iter()
            .find_map(|attribute| match attribute {
                Attribute::Modulus(modulus) => Some(modulus),
                _ => None,
            })
            .ok_or_else(|| TokenError::Device("missing CKA_MODULUS".to_owned()))?;

        let leading_zeros = modulus.iter().take_while(|byte| **byte == 0).count();
        Ok(modulus.len() - leading_zeros)
    }

    fn sign(
        &self,
        key: TokenObjectHandle,
        mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        let state = self.state.lock();
        let object = Self::object(&state, key)?;

        state
            .session
            .sign(&to_mechanism(mechanism), object, data)
            .map_err(map_cryptoki_error)
    }

    fn decrypt(
        &self,
        key: TokenObjectHandle,
        mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        let state = self.state.lock();
        let object = Self::object(&state, key)?;

        state
            .session
            .decrypt(&to_mechanism(mechanism), object, data)
            .map_err(map_cryptoki_error)
    }
}

fn to_mechanism(mechanism: TokenMechanism) -> Mechanism<'static> {
    match mechanism {
        TokenMechanism::RsaPkcs => Mechanism::RsaPkcs,
    }
}

fn map_cryptoki_error(error: CryptokiError) -> TokenError {
    match &error {
        CryptokiError::Pkcs11(rv, ..) => match rv {
            RvError::TokenNotPresent | RvError::DeviceRemoved | RvError::SlotIdInvalid => {
                TokenError::NotPresent
            }
            RvError::PinIncorrect
            | RvError::PinLocked
            | RvError::PinExpired
            | RvError::FunctionCanceled
            | RvError::UserNotLoggedIn => TokenError::AuthorizationDenied,
            RvError::SessionClosed | RvError::SessionHandleInvalid => TokenError::SessionClosed,
            RvError::EncryptedDataInvalid | RvError::EncryptedDataLenRange => {
                TokenError::OperationFailed
            }
            _ => TokenError::Device(error.to_string()),
        },
        CryptokiError::LibraryLoading(_) => TokenError::Unreachable(error.to_string()),
        _ => TokenError::Device(error.to_string()),
    }
}
