//! All JeeBoot request and reply types.
//!
//! Every packet a node sends starts with the one-byte RF12 header, followed by
//! a packed little-endian body.  There is no type byte: the body length alone
//! tells the three request kinds apart.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Body length of a pairing request.
pub const PAIRING_REQUEST_LEN: usize = 22;

/// Body length of an upgrade request (and of an upgrade reply).
pub const UPGRADE_REQUEST_LEN: usize = 8;

/// Body length of a download request.
pub const DOWNLOAD_REQUEST_LEN: usize = 4;

/// Number of firmware bytes carried by one download reply.
pub const DOWNLOAD_BLOCK_SIZE: usize = 64;

/// Length of a hardware ID or a shared key.
pub const HW_ID_LEN: usize = 16;

/// Mask selecting the node ID bits of an RF12 header byte.
pub const RF12_HDR_NODE_MASK: u8 = 0x1F;

/// A 16-byte unique hardware ID.  All zeroes means "not assigned yet".
pub type HwId = [u8; HW_ID_LEN];

// ── Requests (node → server) ──────────────────────────────────────────────────

/// "Who am I?" – sent by a node right after reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingRequest {
    /// Variant of remote node, 1..250 freely available.
    pub variant: u8,
    /// Type of remote node, 100..250 freely available.
    pub board: u8,
    /// Current network group, 1..250 or 0 if unpaired.
    pub group: u8,
    /// Current node ID, 1..30 or 0 if unpaired.
    pub node_id: u8,
    /// CRC checksum over the current shared key.
    pub check: u16,
    /// Unique hardware ID, or all zeroes if not available.
    pub hw_id: HwId,
}

/// "Which software should I run?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub variant: u8,
    pub board: u8,
    /// Current software ID, 0 if unknown.
    pub sw_id: u16,
    /// Current software download size, in units of 16 bytes.
    pub sw_size: u16,
    /// Current CRC checksum over the entire download.
    pub sw_check: u16,
}

/// "Give me block `sw_index` of software `sw_id`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadRequest {
    pub sw_id: u16,
    /// Current download index, as a multiple of [`DOWNLOAD_BLOCK_SIZE`].
    pub sw_index: u16,
}

/// One decoded request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootRequest {
    Pairing(PairingRequest),
    Upgrade(UpgradeRequest),
    Download(DownloadRequest),
}

impl BootRequest {
    /// Short name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BootRequest::Pairing(_) => "pairing",
            BootRequest::Upgrade(_) => "upgrade",
            BootRequest::Download(_) => "download",
        }
    }
}

/// A complete packet: RF12 header byte plus the decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub header: u8,
    pub request: BootRequest,
}

impl Packet {
    /// Node ID bits of the RF12 header.
    pub fn node_id(&self) -> u8 {
        self.header & RF12_HDR_NODE_MASK
    }
}

// ── Replies (server → node) ───────────────────────────────────────────────────

/// Sent instead of a [`PairingReply`] when the node has no hardware ID yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingAssign {
    pub variant: u8,
    pub board: u8,
    /// Freshly assigned hardware ID.
    pub hw_id: HwId,
}

/// Pairing details for a known hardware ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingReply {
    pub variant: u8,
    pub board: u8,
    /// Assigned network group, 1..250.
    pub group: u8,
    /// Assigned node ID, 1..30.
    pub node_id: u8,
    /// Shared key, or all zeroes if not used.
    pub shared_key: [u8; HW_ID_LEN],
}

/// Same layout as [`UpgradeRequest`], with the assigned software filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeReply {
    pub variant: u8,
    pub board: u8,
    /// Assigned software ID.
    pub sw_id: u16,
    /// Software download size, in units of 16 bytes.
    pub sw_size: u16,
    /// CRC checksum over the entire download.
    pub sw_check: u16,
}

impl From<UpgradeRequest> for UpgradeReply {
    fn from(req: UpgradeRequest) -> Self {
        Self {
            variant: req.variant,
            board: req.board,
            sw_id: req.sw_id,
            sw_size: req.sw_size,
            sw_check: req.sw_check,
        }
    }
}

/// One block of firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReply {
    /// Software ID xor download index, so the node can match the reply.
    pub sw_id_xor: u16,
    /// Payload, each byte xored with `211 * i`.
    pub data: [u8; DOWNLOAD_BLOCK_SIZE],
}

/// Every reply the server can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootReply {
    PairingAssign(PairingAssign),
    Pairing(PairingReply),
    Upgrade(UpgradeReply),
    Download(DownloadReply),
    /// The requested block lies past the end of the image.
    DownloadEnd { sw_id_xor: u16 },
}
