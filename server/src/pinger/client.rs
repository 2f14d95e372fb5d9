use std::{io, time::Duration};

use log::trace;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};

use holosync_shared::{
    encode_status_request, BufferPool, HandshakePacket, SerdeErr, ServerAddress, StatusResponse,
    VarIntDecoder,
};

use super::error::PingError;

/// Largest status response accepted, in bytes
pub const MAX_RESPONSE_LENGTH: usize = 1 << 21;

/// Runs one status exchange: handshake, empty status request, then a
/// length-prefixed response read in full.
///
/// Both connecting and the exchange itself are bounded by `timeout`.
pub async fn fetch_status(
    address: &ServerAddress,
    timeout: Duration,
) -> Result<StatusResponse, PingError> {
    let target = format!("{}:{}", address.host(), address.port());
    let timed_out = || PingError::Timeout {
        address: target.clone(),
        timeout_ms: timeout.as_millis(),
    };

    let mut stream =
        match time::timeout(timeout, TcpStream::connect((address.host(), address.port()))).await {
            Err(_) => return Err(timed_out()),
            Ok(Err(error)) => {
                return Err(PingError::Connect {
                    address: target.clone(),
                    reason: error.to_string(),
                })
            }
            Ok(Ok(stream)) => stream,
        };

    let response = time::timeout(timeout, exchange(&mut stream, address, &target))
        .await
        .map_err(|_| timed_out())??;
    trace!("Pinger: {} answered with {} bytes", target, response.json.len());
    Ok(response)
}

async fn exchange(
    stream: &mut TcpStream,
    address: &ServerAddress,
    target: &str,
) -> Result<StatusResponse, PingError> {
    let pool = BufferPool::default();
    let handshake = HandshakePacket::status(address.host(), address.port()).encode(&pool)?;
    let request = encode_status_request(&pool)?;

    let io_error = |error: io::Error| PingError::Io {
        address: target.to_string(),
        reason: error.to_string(),
    };
    stream.write_all(&handshake).await.map_err(io_error)?;
    stream.write_all(&request).await.map_err(io_error)?;
    stream.flush().await.map_err(io_error)?;

    let length = read_length(stream).await.map_err(|error| into_ping_error(error, target))?;
    if length > MAX_RESPONSE_LENGTH {
        return Err(PingError::ResponseTooLarge {
            length,
            max: MAX_RESPONSE_LENGTH,
        });
    }

    let mut contents = vec![0; length];
    stream
        .read_exact(&mut contents)
        .await
        .map_err(|error| into_ping_error(ReadError::Io(error, length), target))?;
    Ok(StatusResponse::decode_contents(&contents)?)
}

enum ReadError {
    Serde(SerdeErr),
    // the error and how many bytes were wanted
    Io(io::Error, usize),
}

/// Reads a VarInt length prefix one byte at a time
async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<usize, ReadError> {
    let mut decoder = VarIntDecoder::new();
    loop {
        let byte = reader.read_u8().await.map_err(|error| ReadError::Io(error, 1))?;
        if let Some(value) = decoder.push(byte).map_err(ReadError::Serde)? {
            let length = value.get();
            return usize::try_from(length)
                .map_err(|_| ReadError::Serde(SerdeErr::NegativeLength { length }));
        }
    }
}

/// Running out of bytes mid-frame is a protocol error, not a clean close
fn into_ping_error(error: ReadError, target: &str) -> PingError {
    match error {
        ReadError::Serde(error) => PingError::Protocol(error),
        ReadError::Io(error, needed) if error.kind() == io::ErrorKind::UnexpectedEof => {
            PingError::Protocol(SerdeErr::Truncated {
                needed,
                remaining: 0,
            })
        }
        ReadError::Io(error, _) => PingError::Io {
            address: target.to_string(),
            reason: error.to_string(),
        },
    }
}
