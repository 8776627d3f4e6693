pub const CONSOLE_STYLES: &str = r#"
/* Shell */
.console {
    display: flex;
    flex-direction: column;
    height: 100vh;
    background: var(--console-bg, #0f172a);
    color: var(--text-primary, #f8fafc);
    font-family: system-ui, -apple-system, sans-serif;
}

.console-header {
    display: flex;
    align-items: center;
    gap: 1rem;
    padding: 0.75rem 1rem;
    background: var(--header-bg, #1e293b);
    border-bottom: 1px solid var(--border-color, #334155);
    flex-shrink: 0;
}

.console-title {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    font-weight: 600;
    flex: 1;
}

.console-subtitle {
    font-size: 0.8rem;
    opacity: 0.7;
}

.header-actions {
    display: flex;
    gap: 0.5rem;
}

.header-button {
    background: #334155;
    color: inherit;
    border: 1px solid #475569;
    border-radius: 6px;
    padding: 0.3rem 0.7rem;
    font-size: 0.8rem;
    cursor: pointer;
}

.header-button:hover {
    background: #475569;
}

.console-notice {
    display: flex;
    justify-content: space-between;
    padding: 0.4rem 1rem;
    background: #7c2d12;
    font-size: 0.85rem;
}

.split-layout {
    flex: 1;
    min-height: 0;
    display: flex;
}

.split-left {
    flex: 1 1 50%;
    min-width: 0;
    border-right: 1px solid var(--border-color, #334155);
    display: flex;
    flex-direction: column;
}

.split-right {
    flex: 1 1 50%;
    min-width: 0;
    display: flex;
    flex-direction: column;
    overflow-y: auto;
}

/* Connection status */
.connection-status {
    display: flex;
    align-items: center;
    gap: 0.25rem;
    font-size: 0.75rem;
    color: var(--text-secondary, #94a3b8);
}

.connection-status .status-dot {
    font-size: 0.5rem;
    color: #ef4444;
}

.connection-status.connected .status-dot {
    color: #10b981;
}

/* Chat */
.chat-panel {
    display: flex;
    flex-direction: column;
    height: 100%;
}

.panel-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.6rem 1rem;
    border-bottom: 1px solid var(--border-color, #334155);
    font-weight: 600;
}

.messages-container {
    flex: 1;
    overflow-y: auto;
    padding: 1rem;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
}

.empty-state {
    margin: auto;
    text-align: center;
    color: var(--text-secondary, #94a3b8);
}

.message-row {
    display: flex;
    flex-direction: column;
    max-width: 85%;
}

.message-row.user-row {
    align-self: flex-end;
}

.message-row.assistant-row {
    align-self: flex-start;
}

.message-bubble {
    padding: 0.6rem 0.9rem;
    border-radius: 10px;
    white-space: pre-wrap;
    word-break: break-word;
}

.user-row .message-bubble {
    background: #2563eb;
}

.assistant-row .message-bubble {
    background: #1e293b;
    border: 1px solid #334155;
}

.message-meta {
    font-size: 0.7rem;
    opacity: 0.6;
    margin-top: 0.2rem;
}

.agent-chips {
    display: flex;
    flex-wrap: wrap;
    gap: 0.3rem;
    margin-top: 0.4rem;
}

.agent-chip {
    font-size: 0.7rem;
    border-radius: 999px;
    padding: 0.1rem 0.5rem;
    color: #fff;
}

.typing-indicator {
    display: flex;
    gap: 4px;
    padding: 0.6rem 0.9rem;
}

.typing-indicator span {
    width: 6px;
    height: 6px;
    border-radius: 50%;
    background: #94a3b8;
    animation: typing 1.2s infinite ease-in-out;
}

.typing-indicator span:nth-child(2) { animation-delay: 0.2s; }
.typing-indicator span:nth-child(3) { animation-delay: 0.4s; }

@keyframes typing {
    0%, 80%, 100% { opacity: 0.3; }
    40% { opacity: 1; }
}

.chat-input-container {
    display: flex;
    gap: 0.5rem;
    padding: 0.75rem 1rem;
    border-top: 1px solid var(--border-color, #334155);
}

.chat-input {
    flex: 1;
    resize: none;
    background: #0b1222;
    color: inherit;
    border: 1px solid #334155;
    border-radius: 8px;
    padding: 0.5rem;
    font: inherit;
}

.send-button {
    background: #2563eb;
    color: #fff;
    border: none;
    border-radius: 8px;
    padding: 0 1rem;
    cursor: pointer;
}

.send-button:disabled {
    opacity: 0.5;
    cursor: not-allowed;
}

/* Agent activity */
.agent-panel {
    display: flex;
    flex-direction: column;
    min-height: 0;
}

.progress-chip {
    font-size: 0.75rem;
    background: #2563eb;
    border-radius: 999px;
    padding: 0.1rem 0.6rem;
}

.progress-bar {
    height: 3px;
    background: #1e293b;
}

.progress-fill {
    height: 100%;
    background: #2563eb;
    transition: width 0.2s ease;
}

.panel-tabs {
    display: flex;
    border-bottom: 1px solid var(--border-color, #334155);
}

.panel-tab {
    flex: 1;
    background: none;
    color: inherit;
    border: none;
    padding: 0.5rem;
    cursor: pointer;
    opacity: 0.7;
}

.panel-tab.active {
    opacity: 1;
    border-bottom: 2px solid #2563eb;
}

.panel-body {
    padding: 1rem;
    display: flex;
    flex-direction: column;
    gap: 0.6rem;
}

.agent-card {
    border: 1px solid #334155;
    border-left-width: 4px;
    border-radius: 8px;
    background: #111a2e;
}

.agent-card-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.6rem 0.8rem;
    cursor: pointer;
}

.agent-info {
    display: flex;
    align-items: center;
    gap: 0.6rem;
}

.agent-icon {
    font-size: 1.4rem;
}

.agent-type {
    font-size: 0.75rem;
    opacity: 0.6;
}

.agent-stats {
    display: flex;
    gap: 0.4rem;
    font-size: 0.75rem;
}

.stat-chip {
    border: 1px solid #475569;
    border-radius: 999px;
    padding: 0.1rem 0.5rem;
}

.agent-details {
    padding: 0 0.8rem 0.8rem;
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
}

.section-label {
    font-size: 0.75rem;
    font-weight: 600;
    opacity: 0.7;
}

.response-text {
    white-space: pre-wrap;
    font-size: 0.85rem;
}

.tool-call {
    border: 1px solid #334155;
    border-radius: 6px;
    padding: 0.4rem 0.6rem;
}

.tool-call-header {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    cursor: pointer;
    font-size: 0.85rem;
}

.tool-status.success { color: #10b981; }
.tool-status.failed { color: #ef4444; }

.tool-json {
    margin: 0.3rem 0 0;
    padding: 0.5rem;
    background: #0b1222;
    border-radius: 4px;
    font-size: 0.75rem;
    overflow: auto;
}

.timeline {
    display: flex;
    flex-direction: column;
    gap: 0.4rem;
}

.timeline-event {
    display: flex;
    gap: 0.6rem;
    align-items: baseline;
    font-size: 0.85rem;
}

.timeline-time {
    font-family: monospace;
    font-size: 0.75rem;
    opacity: 0.6;
}

.timeline-marker {
    width: 8px;
    height: 8px;
    border-radius: 50%;
    flex-shrink: 0;
}

.timeline-footer {
    margin-top: 0.5rem;
    font-size: 0.8rem;
    opacity: 0.7;
}

/* Metrics */
.metric-grid {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 0.6rem;
}

.metric-card {
    border: 1px solid #334155;
    border-radius: 8px;
    padding: 0.6rem;
    background: #111a2e;
}

.metric-label {
    font-size: 0.7rem;
    opacity: 0.6;
}

.metric-value {
    font-size: 1.2rem;
    font-weight: 600;
}

.metrics-table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.8rem;
}

.metrics-table th,
.metrics-table td {
    text-align: left;
    padding: 0.3rem 0.4rem;
    border-bottom: 1px solid #1e293b;
}
"#;
