pub struct Icons;

impl Icons {
    pub const HOSPITAL: &str = "🏥";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const CLIPBOARD: &str = "📋";
    pub const DEL: &str = "🗑️";
    pub const STETHOSCOPE: &str = "🩺";
    pub const MONEY: &str = "💰";
    pub const GLOBE: &str = "🌍";
    pub const PEOPLE: &str = "👨‍👩‍👧";
    pub const CLOCK: &str = "⏱️";
    pub const STAR: &str = "⭐";
    pub const PILL: &str = "💊";
}
