//! Dashboard HTML template

pub const TEMPLATE: &str = r#"
    <div class="banner hidden" id="errorBanner">Connection error: server unreachable, retrying...</div>
    <div class="container">
        <header>
            <div>
                <h1>Sniper Signals</h1>
                <span class="refresh-time" id="refreshTime">Loading...</span>
            </div>
            <span class="status-badge status-disconnected" id="phaseBadge">Disconnected</span>
        </header>

        <div class="grid">
            <!-- Connection -->
            <div class="card">
                <div class="card-header">
                    <span class="card-title">Broker Connection</span>
                    <span class="dim" id="brokerName">--</span>
                </div>
                <div id="tokenForm">
                    <input type="password" id="tokenInput" placeholder="API token">
                    <button class="btn btn-primary" onclick="connectBroker()">Connect</button>
                </div>
                <div class="hidden" id="accountPanel">
                    <div class="card-value" id="balance">--</div>
                    <div class="metrics">
                        <div class="metric">
                            <div class="metric-label">Account</div>
                            <div class="metric-value" id="accountType">--</div>
                        </div>
                        <div class="metric">
                            <div class="metric-label">Login</div>
                            <div class="metric-value" id="loginId">--</div>
                        </div>
                    </div>
                    <button class="btn btn-secondary" onclick="disconnectBroker()">Disconnect</button>
                </div>
                <div class="error-text hidden" id="lastError"></div>
            </div>

            <!-- Signal -->
            <div class="card">
                <div class="card-header">
                    <span class="card-title">Live Signal</span>
                </div>
                <div class="signal-controls">
                    <input type="text" id="signalSymbol">
                    <select id="signalTimeframe">
                        <option value="1m">1m</option>
                        <option value="2m">2m</option>
                        <option value="3m">3m</option>
                        <option value="5m">5m</option>
                        <option value="10m">10m</option>
                        <option value="15m">15m</option>
                        <option value="30m">30m</option>
                        <option value="1h">1h</option>
                        <option value="2h">2h</option>
                        <option value="4h">4h</option>
                        <option value="8h">8h</option>
                        <option value="1d">1d</option>
                    </select>
                    <select id="signalStrategy"></select>
                </div>
                <div class="signal-direction neutral" id="signalDirection">--</div>
                <div class="metrics">
                    <div class="metric">
                        <div class="metric-label">Confidence</div>
                        <div class="metric-value" id="signalConfidence">--</div>
                    </div>
                    <div class="metric">
                        <div class="metric-label">Trend</div>
                        <div class="metric-value" id="signalTrend">--</div>
                    </div>
                    <div class="metric">
                        <div class="metric-label">Entry / Exit</div>
                        <div class="metric-value" id="signalWindow">--</div>
                    </div>
                </div>
                <div class="dim" id="signalStrategyUsed"></div>
                <div class="mono" id="signalIndicators"></div>
                <div class="dim" id="signalNote">Connect first</div>
            </div>
        </div>

        <!-- Bots -->
        <div class="card">
            <div class="card-header">
                <span class="card-title">Bots</span>
            </div>
            <form class="bot-form" onsubmit="createBot(event)">
                <input type="text" id="botName" placeholder="Name" required>
                <input type="text" id="botSymbol" placeholder="Symbol" required>
                <input type="text" id="botTimeframe" placeholder="Timeframe" value="5m" required>
                <input type="number" id="botStopLoss" placeholder="Stop loss" step="any" required>
                <input type="number" id="botTakeProfit" placeholder="Take profit" step="any" required>
                <button class="btn btn-primary" type="submit">Create</button>
            </form>
            <table>
                <thead>
                    <tr>
                        <th>Name</th>
                        <th>Symbol</th>
                        <th>TF</th>
                        <th>SL</th>
                        <th>TP</th>
                        <th>State</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody id="botsBody">
                    <tr><td colspan="7" class="empty">No bots yet</td></tr>
                </tbody>
            </table>
        </div>

        <!-- Activity -->
        <div class="card">
            <div class="card-header">
                <span class="card-title">Activity</span>
            </div>
            <div class="log" id="activityLog"></div>
        </div>
    </div>
"#;
