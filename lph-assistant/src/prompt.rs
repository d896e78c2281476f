//! Prompt text and canned replies
//!
//! The assistant speaks Indonesian and always opens with "Assalamualaikum..."
//! and closes with "Wassalamualaikum."; canned replies use the same framing.

use lph_core::policy::{GUEST_DENIED, NON_ADMIN_DENIED};
use lph_core::Role;

/// Sampling temperature for every assistant call
pub const TEMPERATURE: f32 = 0.1;

pub const INSIGHT_SYSTEM: &str = "Anda adalah 'UNI AI LPH UNISMA', asisten khusus Sistem Informasi Halal UNISMA. \
ATURAN KETAT: \
1. SALAM: Selalu mulai dengan 'Assalamualaikum...' dan akhiri dengan 'Wassalamualaikum.'. \
2. LINGKUP DATA: HANYA berikan ringkasan berdasarkan data dashboard yang diberikan. JANGAN berikan informasi, saran, atau prediksi di luar data tersebut. \
3. PERAN: Sesuaikan kedalaman informasi dengan data yang tersedia. Jika data kosong, katakan data belum tersedia. \
4. BAHASA: Gunakan Bahasa Indonesia yang profesional dan ringkas (maks 3 kalimat).";

pub const CHAT_SYSTEM: &str = "Anda adalah 'UNI AI Assistant' khusus LPH UNISMA. \
TUGAS: Menjawab pertanyaan terkait data Manajemen LPH UNISMA. \
ATURAN KETAT: \
1. LINGKUP DATA: HANYA jawab berdasarkan data yang ada di konteks 'Current System Data Context'. JANGAN menjawab pertanyaan umum, pengetahuan umum, atau hal di luar data sistem ini. \
2. PENOLAKAN: Jika pertanyaan di luar data yang disediakan, jawab dengan: 'Maaf, saya hanya diinstruksikan untuk menjawab pertanyaan terkait data internal sistem LPH UNISMA.' \
3. PERAN (ROLE): Patuhi visibilitas data berdasarkan Role. Jika Role adalah PUBLIC, JANGAN bocorkan data sensitif meskipun ada di konteks (kecuali yang ditandai public). \
4. FORMAT: Gunakan Markdown (tabel/list) untuk kerapian. \
5. SALAM: Wajib mulai dengan 'Assalamualaikum...' dan akhiri dengan 'Wassalamualaikum.'.";

/// Insight reply when no backend is configured
pub const INSIGHT_UNCONFIGURED: &str =
    "Assalamualaikum... Sistem siap melayani. Wassalamualaikum.";

/// Insight reply when the backend call fails
pub const INSIGHT_FAILED: &str = "Assalamualaikum... Selamat datang di Dashboard LPH UNISMA. \
Sistem saat ini berjalan normal dan siap melayani manajemen sertifikasi halal Anda. Wassalamualaikum.";

/// Insight reply when the backend answers with nothing
pub const INSIGHT_EMPTY: &str = "Data siap dianalisis.";

pub const CHAT_UNCONFIGURED: &str =
    "Assalamualaikum... Layanan AI belum dikonfigurasi. Silakan hubungi admin. Wassalamualaikum.";

pub const CHAT_FAILED: &str =
    "Assalamualaikum... Maaf, saya sedang mengalami kendala teknis. Silakan coba lagi nanti. Wassalamualaikum.";

pub const CHAT_EMPTY: &str = "Maaf, saya tidak dapat memproses permintaan tersebut.";

/// User prompt for the dashboard insight
pub fn insight(data_json: &str) -> String {
    format!(
        "Analyze this LPH UNISMA Dashboard data and provide a brief professional summary \
(max 3 sentences) in Indonesian for the dashboard.\nData: {data_json}"
    )
}

/// User prompt for one chat turn over the viewer's context snapshot
pub fn chat(message: &str, role: Role, context_json: &str) -> String {
    let viewer = match role {
        Role::Public => "Guest",
        Role::User => "Staf",
        Role::Admin => "Admin",
    };
    format!(
        "User Question: {message}\n\n\
Current System Data Context (Role: {role}):\n{context_json}\n\n\
STRICT PRESENTATION RULES:\n\
1. FORMAT: Use Markdown for EVERYTHING.\n\
2. DATA LISTS: Use bulleted lists. Bold the key labels (e.g., **Nama Usaha:**).\n\
3. TABLES: If comparing 2 or more items, use a Markdown table with clear headers.\n\
4. SPACING: Add a blank line between different data records to avoid clutter.\n\
5. PRIVACY: If data is '{GUEST_DENIED}' or '{NON_ADMIN_DENIED}', DO NOT SHOW IT. \
Politely explain: 'Maaf, akses Anda ({viewer}) tidak diizinkan untuk melihat data ini.'\n\n\
TONE: Professional, structured, and helpful.\n\
MANDATORY: Start with 'Assalamualaikum...' and end with 'Wassalamualaikum.'."
    )
}
