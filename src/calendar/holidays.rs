//! Built-in public holiday tables.
//!
//! Dates are national (Malaysia: Federal Territory of Kuala Lumpur)
//! gazetted holidays. When a holiday falls on a weekend and the region
//! observes a replacement day, the replacement is listed instead of (or in
//! addition to) the weekend date. Weekend entries are harmless: weekends are
//! skipped regardless.
//!
//! Lunar and Islamic dates are those announced for the year; they must be
//! refreshed when a new year's gazette is published.

/// (year, month, day)
pub(crate) type HolidayDate = (i32, u32, u32);

pub(crate) const MALAYSIA: &[HolidayDate] = &[
    // 2025
    (2025, 1, 1),   // New Year's Day
    (2025, 1, 29),  // Chinese New Year
    (2025, 1, 30),  // Chinese New Year (2nd day)
    (2025, 2, 1),   // Federal Territory Day
    (2025, 2, 11),  // Thaipusam
    (2025, 3, 18),  // Nuzul Al-Quran
    (2025, 3, 31),  // Hari Raya Aidilfitri
    (2025, 4, 1),   // Hari Raya Aidilfitri (2nd day)
    (2025, 5, 1),   // Labour Day
    (2025, 5, 12),  // Wesak Day
    (2025, 6, 2),   // Agong's Birthday
    (2025, 6, 7),   // Hari Raya Haji
    (2025, 6, 27),  // Awal Muharram
    (2025, 8, 31),  // National Day
    (2025, 9, 1),   // National Day (observed)
    (2025, 9, 5),   // Prophet Muhammad's Birthday
    (2025, 9, 16),  // Malaysia Day
    (2025, 10, 20), // Deepavali
    (2025, 12, 25), // Christmas Day
    // 2026
    (2026, 1, 1),   // New Year's Day
    (2026, 2, 1),   // Federal Territory Day / Thaipusam
    (2026, 2, 2),   // Federal Territory Day (observed)
    (2026, 2, 17),  // Chinese New Year
    (2026, 2, 18),  // Chinese New Year (2nd day)
    (2026, 3, 7),   // Nuzul Al-Quran
    (2026, 3, 21),  // Hari Raya Aidilfitri
    (2026, 3, 22),  // Hari Raya Aidilfitri (2nd day)
    (2026, 3, 23),  // Hari Raya Aidilfitri (observed)
    (2026, 5, 1),   // Labour Day
    (2026, 5, 27),  // Hari Raya Haji
    (2026, 5, 31),  // Wesak Day
    (2026, 6, 1),   // Agong's Birthday
    (2026, 6, 2),   // Wesak Day (observed)
    (2026, 6, 17),  // Awal Muharram
    (2026, 8, 25),  // Prophet Muhammad's Birthday
    (2026, 8, 31),  // National Day
    (2026, 9, 16),  // Malaysia Day
    (2026, 11, 8),  // Deepavali
    (2026, 11, 9),  // Deepavali (observed)
    (2026, 12, 25), // Christmas Day
];

pub(crate) const SINGAPORE: &[HolidayDate] = &[
    // 2025
    (2025, 1, 1),   // New Year's Day
    (2025, 1, 29),  // Chinese New Year
    (2025, 1, 30),  // Chinese New Year (2nd day)
    (2025, 3, 31),  // Hari Raya Puasa
    (2025, 4, 18),  // Good Friday
    (2025, 5, 1),   // Labour Day
    (2025, 5, 3),   // Polling Day
    (2025, 5, 12),  // Vesak Day
    (2025, 6, 7),   // Hari Raya Haji
    (2025, 8, 9),   // National Day
    (2025, 10, 20), // Deepavali
    (2025, 12, 25), // Christmas Day
    // 2026
    (2026, 1, 1),   // New Year's Day
    (2026, 2, 17),  // Chinese New Year
    (2026, 2, 18),  // Chinese New Year (2nd day)
    (2026, 3, 21),  // Hari Raya Puasa
    (2026, 4, 3),   // Good Friday
    (2026, 5, 1),   // Labour Day
    (2026, 5, 27),  // Hari Raya Haji
    (2026, 5, 31),  // Vesak Day
    (2026, 6, 1),   // Vesak Day (observed)
    (2026, 8, 9),   // National Day
    (2026, 8, 10),  // National Day (observed)
    (2026, 11, 8),  // Deepavali
    (2026, 11, 9),  // Deepavali (observed)
    (2026, 12, 25), // Christmas Day
];

pub(crate) const VIETNAM: &[HolidayDate] = &[
    // 2025
    (2025, 1, 1),  // New Year's Day
    (2025, 1, 27), // Tet
    (2025, 1, 28), // Tet
    (2025, 1, 29), // Tet
    (2025, 1, 30), // Tet
    (2025, 1, 31), // Tet
    (2025, 4, 7),  // Hung Kings Commemoration
    (2025, 4, 30), // Reunification Day
    (2025, 5, 1),  // Labour Day
    (2025, 9, 1),  // National Day holiday
    (2025, 9, 2),  // National Day
    // 2026
    (2026, 1, 1),  // New Year's Day
    (2026, 2, 16), // Tet
    (2026, 2, 17), // Tet
    (2026, 2, 18), // Tet
    (2026, 2, 19), // Tet
    (2026, 2, 20), // Tet
    (2026, 4, 27), // Hung Kings Commemoration (observed)
    (2026, 4, 30), // Reunification Day
    (2026, 5, 1),  // Labour Day
    (2026, 9, 1),  // National Day holiday
    (2026, 9, 2),  // National Day
];
