//! Status lines shown under a loading title.

/// Pool the status line is picked from when no subtitle is given.
pub const STATUS_MESSAGES: [&str; 71] = [
    "Loading, please wait.",
    "Fetching data, hold on.",
    "Processing your request.",
    "Hang tight, loading now.",
    "Almost done, one moment.",
    "Thank you for waiting.",
    "Preparing your content.",
    "Just a moment, loading.",
    "Loading, we’re on it.",
    "Fetching content for you.",
    "Please wait a moment.",
    "Loading, nearly there.",
    "Thanks for your patience.",
    "Hold on, working on it.",
    "Getting things ready.",
    "Loading your data now.",
    "Processing, hang tight.",
    "Content loading shortly.",
    "Please hold on a sec.",
    "We’re working on it.",
    "Loading, almost there.",
    "Just a moment please.",
    "Preparing things now.",
    "We’re on it, hold on.",
    "Content on the way.",
    "Your data is loading.",
    "Loading, stay tuned.",
    "Almost ready, hold on.",
    "Fetching info for you.",
    "Hang tight, processing.",
    "Loading up, please wait.",
    "Getting your data now.",
    "One sec, almost done.",
    "Hold tight, we’re close.",
    "Preparing things for you.",
    "We’re loading, thanks.",
    "Fetching now, hold on.",
    "One moment, loading.",
    "Processing info, hang tight.",
    "Your content is on its way.",
    "Just a sec, loading.",
    "Please stand by.",
    "Hang on, preparing now.",
    "Content loading, thank you.",
    "Retrieving data, hold on.",
    "Loading now, one moment.",
    "We’re setting things up.",
    "Preparing to display content.",
    "Processing quickly, hold on.",
    "Getting everything ready.",
    "Finalizing things, one moment.",
    "We’re almost ready.",
    "Thanks for bearing with us.",
    "Loading your request now.",
    "Please wait while we load.",
    "Hang tight, preparing now.",
    "Working on your request.",
    "Getting things done for you.",
    "Almost finished loading.",
    "Just a bit more, loading.",
    "Setting things up for you.",
    "Hold tight, finishing up.",
    "Loading, thanks for waiting.",
    "One moment, getting ready.",
    "We’re nearly finished.",
    "Please wait, almost there.",
    "Your data is coming soon.",
    "Just a few seconds more.",
    "Preparing everything now.",
    "Content is almost ready.",
    "Final touches, hold on.",
];
