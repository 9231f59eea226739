//! Daily motivational quote for the wellness overview.

use chrono::{Datelike, NaiveDate};

pub const MOTIVATIONAL_QUOTES: &[&str] = &[
    "Keep Pushing, Never Quit.",
    "Every Step Forward Is Progress.",
    "You Are Stronger Than You Think.",
    "Small Steps Lead To Big Changes.",
    "Consistency Is The Key To Success.",
    "Your Only Limit Is You.",
    "Believe In Your Journey.",
    "Progress, Not Perfection.",
    "Transform One Day At A Time.",
    "You've Got This!",
    "Your Health Is Your Wealth.",
    "Invest In Yourself Daily.",
    "Nourish Your Body, Feed Your Soul.",
    "Strong Body, Strong Mind.",
    "Take Care Of Yourself First.",
    "Wellness Is A Journey, Not A Destination.",
    "Self-Care Isn't Selfish.",
    "Dream Big, Work Hard, Stay Focused.",
    "Success Is Built Daily, Not Overnight.",
    "Make Today Count.",
    "Every Day Is A Fresh Start.",
    "Your Future Self Will Thank You.",
    "Transformation Starts Within.",
    "Glow From The Inside Out.",
    "Become The Best Version Of Yourself.",
    "Change Your Habits, Change Your Life.",
    "Celebrate Every Milestone.",
    "Good Things Take Time.",
    "Trust The Process.",
    "Consistency Beats Intensity.",
    "Don't Stop Until You're Proud.",
    "Be Stronger Than Your Excuses.",
    "Confidence Is The Best Outfit.",
    "Love The Skin You're In.",
    "Sweat Today, Smile Tomorrow.",
    "Sore Today, Strong Tomorrow.",
    "Eat Well, Live Well, Be Well.",
    "Nourish To Flourish.",
    "Grow Through What You Go Through.",
    "Fall Seven Times, Stand Up Eight.",
    "The Comeback Is Always Stronger Than The Setback.",
    "Keep Going. You're Closer Than You Think.",
];

/// The quote for `date`. Stable for the whole day, cycling by day of year.
pub fn daily_quote(date: NaiveDate) -> &'static str {
    MOTIVATIONAL_QUOTES[date.ordinal() as usize % MOTIVATIONAL_QUOTES.len()]
}
